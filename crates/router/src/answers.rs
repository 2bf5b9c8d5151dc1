//! Templated German answers for the paths that need no reasoning call.

use luxroute_core::catalog::{CatalogItem, CategoryCount};
use luxroute_core::route::FastPattern;
use luxroute_extract::{CannedTopic, OverviewKind, ProductQuestion, QuestionKind, ip};

fn price_text(price: f64) -> String {
    format!("{price:.2}").replace('.', ",") + " €"
}

/// Answer a question about one resolved product.
pub fn product_answer(question: &ProductQuestion, item: &CatalogItem) -> String {
    let name = &item.name;
    match question.kind {
        QuestionKind::Dimmable => {
            if item.is_dimmable() {
                match &item.operating_mode {
                    Some(mode) => format!("Ja, {name} ist dimmbar. Steuerung: {mode}"),
                    None => format!("Ja, {name} ist dimmbar."),
                }
            } else {
                format!("Nein, {name} ist nicht dimmbar.")
            }
        }
        QuestionKind::Brightness => match item.lumen {
            Some(lumen) => format!("{name} hat {lumen:.0} Lumen."),
            None => format!("Die Lumenangabe für {name} ist nicht verfügbar."),
        },
        QuestionKind::Power => match item.wattage {
            Some(watt) => format!("{name} hat eine Leistung von {watt} Watt."),
            None => format!("Die Leistungsangabe für {name} ist nicht verfügbar."),
        },
        QuestionKind::ColorTemperature => match item.cct_summary() {
            Some(cct) => format!("{name} hat eine Farbtemperatur von {cct}."),
            None => format!("Die Farbtemperatur für {name} ist nicht verfügbar."),
        },
        QuestionKind::Protection => match &item.ingress_protection {
            Some(code) => format!("{name} hat Schutzklasse {code}."),
            None => format!("Für {name} ist keine Schutzklasse hinterlegt."),
        },
        QuestionKind::Color => match &item.housing_color {
            Some(color) => format!("{name} hat ein Gehäuse in {color}."),
            None => format!("Die Gehäusefarbe von {name} ist nicht hinterlegt."),
        },
        QuestionKind::Price => match item.price {
            Some(price) => format!("{name} kostet {}.", price_text(price)),
            None => format!("Der Preis für {name} ist auf Anfrage."),
        },
        QuestionKind::Availability => {
            if item.available {
                format!("{name} ist verfügbar.")
            } else {
                format!("{name} ist derzeit leider nicht verfügbar.")
            }
        }
        QuestionKind::Suitability => {
            let usage = item
                .ingress_protection
                .as_deref()
                .and_then(|code| {
                    ip::extract_codes(code)
                        .into_iter()
                        .max_by_key(|c| ip::rank(c))
                        .and_then(|best| ip::describe(&best))
                        .map(|desc| format!("{name} hat Schutzklasse {code} ({desc})."))
                });
            usage.unwrap_or_else(|| product_summary(item))
        }
        QuestionKind::General => product_summary(item),
    }
}

/// One-sentence overview of a product's key facts.
pub fn product_summary(item: &CatalogItem) -> String {
    let mut facts = Vec::new();
    if let Some(category) = &item.category_2 {
        facts.push(category.clone());
    }
    if let Some(cct) = item.cct_summary() {
        facts.push(cct);
    }
    if let Some(code) = &item.ingress_protection {
        facts.push(code.clone());
    }
    if let Some(lumen) = item.lumen {
        facts.push(format!("{lumen:.0} Lumen"));
    }
    if item.is_dimmable() {
        facts.push("dimmbar".into());
    }
    if let Some(price) = item.price {
        facts.push(price_text(price));
    }
    if facts.is_empty() {
        format!("Zu {} habe ich keine weiteren Angaben.", item.name)
    } else {
        format!("{}: {}.", item.name, facts.join(", "))
    }
}

pub fn product_not_found(name: &str) -> String {
    format!(
        "Leider habe ich kein Produkt mit dem Namen „{name}“ gefunden. \
         Prüfe bitte die Schreibweise oder nenne mir die Artikelnummer."
    )
}

/// Listing of sub-categories with their product counts.
pub fn overview_answer(kind: OverviewKind, counts: &[CategoryCount]) -> String {
    if counts.is_empty() {
        return "Leider haben wir derzeit keine Produkte in dieser Kategorie.".to_string();
    }
    let total: usize = counts.iter().map(|c| c.count).sum();
    let opener = match kind {
        OverviewKind::TrackSystems => "Ja, wir haben verschiedene Schienensysteme!",
        OverviewKind::Categories => "Gern, hier ist unser Sortiment im Überblick.",
    };
    let lines = counts
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{}. **{}** ({} Produkte)", i + 1, c.name, c.count))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "{opener} Insgesamt {total} Produkte in {} Kategorien:\n\n{lines}\n\n\
         Wovon möchtest du mehr wissen? Einfach eine der Kategorien nennen!",
        counts.len()
    )
}

/// Summary for a protection-class listing.
pub fn protection_answer(min_code: &str, found: usize) -> String {
    if found == 0 {
        return format!("Leider habe ich keine Leuchten mit mindestens {min_code} Schutz gefunden.");
    }
    let area = if ip::rank(min_code) <= ip::rank("IP44") {
        "Feuchträume wie Badezimmer"
    } else {
        "den Außenbereich"
    };
    format!("Ich habe {found} Leuchten mit mindestens {min_code} Schutz gefunden. Diese eignen sich für {area}.")
}

/// Fixed answer for an educational question.
pub fn canned_answer(topic: &CannedTopic) -> String {
    match topic {
        CannedTopic::IpCode(code) => match ip::describe(code) {
            Some(desc) => format!(
                "{code} bedeutet: {desc}. Die erste Ziffer steht für den Schutz gegen \
                 Fremdkörper, die zweite für den Schutz gegen Wasser."
            ),
            None => canned_answer(&CannedTopic::IpClasses),
        },
        CannedTopic::IpClasses => "IP-Schutzklassen geben an, wie gut ein Gerät gegen Eindringen \
             von Fremdkörpern und Feuchtigkeit geschützt ist. Für Innenräume reicht meist IP20, \
             Badezimmer brauchen mindestens IP44, im Außenbereich empfehlen sich IP65 oder höher."
            .to_string(),
        CannedTopic::WarmVsCold => "Warmweiß (2700-3500K) erzeugt eine gemütliche Atmosphäre, \
             Kaltweiß (5000-6500K) ist heller und konzentrationsfördernder. Für Wohnräume \
             empfehlen wir meist 2700K bis 3000K, für Arbeitsbereiche 4000K."
            .to_string(),
        CannedTopic::Sdcm => "SDCM beschreibt die Farbkonsistenz zwischen einzelnen Leuchten. \
             Je kleiner der Wert, desto einheitlicher wirkt das Licht: SDCM 3 oder weniger \
             gilt als Premium, bis 4 als hoch."
            .to_string(),
        CannedTopic::Cct => "Die Farbtemperatur (CCT) wird in Kelvin angegeben. Niedrige Werte \
             wie 2700K wirken warm und gemütlich, höhere Werte wie 4000K neutral und sachlich."
            .to_string(),
    }
}

/// Reply for a fast path that found nothing.
pub fn nothing_found(filters: &[String]) -> String {
    if filters.is_empty() {
        "Leider habe ich keine passenden Produkte gefunden. Versuche es gern mit anderen \
         Suchbegriffen."
            .to_string()
    } else {
        format!(
            "Leider habe ich keine Produkte gefunden, die alle Kriterien erfüllen ({}). \
             Versuche es gern mit weniger Einschränkungen.",
            filters.join(", ")
        )
    }
}

/// Default follow-up prompts per fast-path pattern.
pub fn follow_ups(pattern: FastPattern) -> Vec<String> {
    let prompts: &[&str] = match pattern {
        FastPattern::ProductQuestion => &[
            "Möchtest du ähnliche Produkte sehen?",
            "Soll ich dir weitere Details nennen?",
        ],
        FastPattern::LedStrip => &[
            "Brauchst du passende Verbinder oder Netzteile?",
            "Soll ich nach einer bestimmten Farbtemperatur filtern?",
        ],
        FastPattern::CategoryOverview => &["Welche Kategorie interessiert dich?"],
        FastPattern::CannedAnswer => &[
            "Haben Sie weitere Fragen?",
            "Soll ich Ihnen passende Produkte zeigen?",
        ],
        FastPattern::ProtectionOnly => &[
            "Suchst du eine bestimmte Leuchtenart?",
            "Soll ich nach Preis sortieren?",
        ],
        FastPattern::DimToWarm
        | FastPattern::TypeWithCct
        | FastPattern::TypeOnly
        | FastPattern::TypeWithProtection => &[
            "Soll ich nach Farbtemperatur filtern?",
            "Möchtest du die günstigsten Modelle sehen?",
        ],
    };
    prompts.iter().map(|p| p.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lamp() -> CatalogItem {
        CatalogItem {
            id: 5,
            name: "Salsa Lid".into(),
            category_2: Some("Pendant lamps".into()),
            cct: Some(2700),
            ingress_protection: Some("IP20".into()),
            operating_mode: Some("DALI dimmable".into()),
            price: Some(249.0),
            available: true,
            ..CatalogItem::default()
        }
    }

    fn ask(kind: QuestionKind) -> String {
        product_answer(
            &ProductQuestion {
                name: "Salsa Lid".into(),
                kind,
            },
            &lamp(),
        )
    }

    #[test]
    fn product_answers() {
        assert_eq!(ask(QuestionKind::Dimmable), "Ja, Salsa Lid ist dimmbar. Steuerung: DALI dimmable");
        assert_eq!(ask(QuestionKind::Brightness), "Die Lumenangabe für Salsa Lid ist nicht verfügbar.");
        assert_eq!(ask(QuestionKind::Price), "Salsa Lid kostet 249,00 €.");
        assert_eq!(ask(QuestionKind::ColorTemperature), "Salsa Lid hat eine Farbtemperatur von 2700K.");
        assert!(ask(QuestionKind::Suitability).contains("Innenbereich"));
        assert!(ask(QuestionKind::General).starts_with("Salsa Lid: Pendant lamps, 2700K"));
    }

    #[test]
    fn not_dimmable() {
        let item = CatalogItem {
            operating_mode: Some("On/Off".into()),
            ..lamp()
        };
        let q = ProductQuestion {
            name: "Salsa Lid".into(),
            kind: QuestionKind::Dimmable,
        };
        assert_eq!(product_answer(&q, &item), "Nein, Salsa Lid ist nicht dimmbar.");
    }

    #[test]
    fn overview_lists_counts() {
        let counts = vec![
            CategoryCount { name: "3 circuit track system luminaires".into(), count: 12 },
            CategoryCount { name: "1 circuit track system luminaires".into(), count: 4 },
        ];
        let text = overview_answer(OverviewKind::TrackSystems, &counts);
        assert!(text.starts_with("Ja, wir haben verschiedene Schienensysteme! Insgesamt 16 Produkte in 2 Kategorien:"));
        assert!(text.contains("1. **3 circuit track system luminaires** (12 Produkte)"));
        assert!(overview_answer(OverviewKind::Categories, &[]).starts_with("Leider"));
    }

    #[test]
    fn protection_texts() {
        assert!(protection_answer("IP44", 3).ends_with("Feuchträume wie Badezimmer."));
        assert!(protection_answer("IP65", 2).ends_with("den Außenbereich."));
        assert_eq!(
            protection_answer("IP67", 0),
            "Leider habe ich keine Leuchten mit mindestens IP67 Schutz gefunden."
        );
    }

    #[test]
    fn canned_texts() {
        assert!(canned_answer(&CannedTopic::IpCode("IP44".into())).contains("Spritzwasser"));
        assert!(canned_answer(&CannedTopic::WarmVsCold).starts_with("Warmweiß (2700-3500K)"));
        assert_eq!(follow_ups(FastPattern::CannedAnswer).len(), 2);
    }

    #[test]
    fn nothing_found_mentions_filters() {
        let text = nothing_found(&["CCT: 3000K".into()]);
        assert!(text.contains("CCT: 3000K"));
    }
}
