//! Food category vocabulary
//!
//! Category bans and requirements are written against category names; the
//! guard compiler expands a name into the ingredient terms listed here.
//! Terms are lowercase Dutch first, with English equivalents for imported
//! recipes. Matching is substring based, so terms avoid short fragments that
//! hide inside unrelated words ("ei" in "prei", "ham" in "champignon").
//! Where a term cannot be avoided, [`term_exclusions`] lists the compound
//! words that contain it without being that food ("bloem" in "bloemkool").

pub const GRAINS: &str = "grains";
pub const DAIRY: &str = "dairy";
pub const LEGUMES: &str = "legumes";
pub const PROCESSED_SUGAR: &str = "processed_sugar";
pub const STARCHY_VEGETABLES: &str = "starchy_vegetables";
pub const HIGH_SUGAR_FRUIT: &str = "high_sugar_fruit";
pub const MEAT: &str = "meat";
pub const PROCESSED_MEAT: &str = "processed_meat";
pub const FISH: &str = "fish";
pub const EGGS: &str = "eggs";
pub const HONEY: &str = "honey";
pub const VEGETABLES: &str = "vegetables";
pub const OLIVE_OIL: &str = "olive_oil";
pub const HEALTHY_FATS: &str = "healthy_fats";
pub const ORGAN_MEAT: &str = "organ_meat";
pub const LEAFY_GREENS: &str = "leafy_greens";
pub const SULFUR_VEGETABLES: &str = "sulfur_vegetables";
pub const COLORED_VEGETABLES: &str = "colored_vegetables";
pub const PROTEIN: &str = "protein";

const GRAIN_TERMS: &[&str] = &[
    "tarwe", "rijst", "pasta", "brood", "haver", "gerst", "rogge", "mais", "maïs", "bloem",
    "couscous", "bulgur", "spelt", "noedels", "wheat", "rice", "bread", "oats", "barley", "rye",
    "corn", "flour", "noodles",
];

const DAIRY_TERMS: &[&str] = &[
    "melk", "kaas", "yoghurt", "boter", "slagroom", "kookroom", "kwark", "milk", "cheese",
    "yogurt", "butter", "cream",
];

const LEGUME_TERMS: &[&str] = &[
    "bonen", "linzen", "kikkererwten", "erwten", "pinda", "soja", "tofu", "tempeh", "beans",
    "lentils", "chickpeas", "peas", "peanut", "soy",
];

const PROCESSED_SUGAR_TERMS: &[&str] = &[
    "suiker", "siroop", "snoep", "frisdrank", "sugar", "syrup", "candy", "soda",
];

const STARCHY_VEGETABLE_TERMS: &[&str] = &[
    "aardappel", "pastinaak", "potato", "parsnip", "yam",
];

const HIGH_SUGAR_FRUIT_TERMS: &[&str] = &[
    "banaan", "druiven", "mango", "ananas", "dadels", "rozijnen", "banana", "grapes",
    "pineapple", "dates", "raisins",
];

const MEAT_TERMS: &[&str] = &[
    "vlees", "kip", "rund", "varken", "lamsvlees", "gehakt", "spek", "worst", "kalkoen",
    "chicken", "beef", "pork", "lamb", "bacon", "sausage", "turkey", "meat",
];

const PROCESSED_MEAT_TERMS: &[&str] = &[
    "worst", "salami", "chorizo", "spek", "bacon", "gerookte ham", "sausage",
];

const FISH_TERMS: &[&str] = &[
    "vis", "zalm", "tonijn", "kabeljauw", "garnalen", "makreel", "haring", "sardine", "ansjovis",
    "fish", "salmon", "tuna", "cod", "shrimp", "mackerel", "herring", "anchovy",
];

const EGG_TERMS: &[&str] = &[
    "eieren", "eidooier", "roerei", "spiegelei", "gekookt ei", "eggs",
];

const HONEY_TERMS: &[&str] = &["honing", "honey"];

const OLIVE_OIL_TERMS: &[&str] = &["olijfolie", "olive oil"];

const HEALTHY_FAT_TERMS: &[&str] = &[
    "avocado", "olijfolie", "kokosolie", "noten", "amandel", "walnoot", "olijven", "olive oil",
    "coconut oil", "nuts", "almond", "walnut",
];

const ORGAN_MEAT_TERMS: &[&str] = &[
    "lever", "runderhart", "kippenhartjes", "niertjes", "liver", "kidney",
];

const LEAFY_GREEN_TERMS: &[&str] = &[
    "spinazie", "boerenkool", "sla", "rucola", "snijbiet", "paksoi", "andijvie", "veldsla",
    "waterkers", "kale", "spinach", "lettuce", "arugula", "chard",
];

const SULFUR_VEGETABLE_TERMS: &[&str] = &[
    "broccoli", "bloemkool", "spruitjes", "kool", "uien", "sjalot", "knoflook", "prei",
    "asperge", "radijs", "champignon", "paddenstoel", "cauliflower", "cabbage", "onion",
    "garlic", "leek", "asparagus", "mushroom",
];

const COLORED_VEGETABLE_TERMS: &[&str] = &[
    "wortel", "biet", "paprika", "tomaat", "pompoen", "bessen", "aardbei", "carrot", "beet",
    "bell pepper", "tomato", "pumpkin", "berries", "strawberr",
];

const VEGETABLE_TERMS: &[&str] = &[
    "groente", "spinazie", "boerenkool", "sla", "broccoli", "bloemkool", "courgette",
    "aubergine", "paprika", "tomaat", "wortel", "prei", "spruitjes", "sperziebonen", "kool",
    "vegetable", "zucchini", "eggplant", "tomato", "carrot", "spinach",
];

const PROTEIN_TERMS: &[&str] = &[
    "kip", "rund", "vis", "zalm", "tonijn", "eieren", "tofu", "tempeh", "linzen", "bonen",
    "kwark", "chicken", "beef", "fish", "salmon", "eggs", "lentils",
];

const TERM_EXCLUSIONS: &[(&str, &[&str])] = &[
    ("bloem", &["bloemkool"]),
    ("rijst", &["bloemkoolrijst", "broccolirijst"]),
    ("pasta", &["tomatenpasta", "notenpasta", "currypasta", "sesampasta"]),
    ("rice", &["cauliflower rice", "broccoli rice"]),
    ("flour", &["almond flour", "coconut flour"]),
    ("corn", &["peppercorn"]),
    (
        "melk",
        &["kokosmelk", "amandelmelk", "havermelk", "sojamelk", "rijstmelk", "cashewmelk"],
    ),
    ("milk", &["coconut milk", "almond milk", "oat milk", "soy milk", "rice milk"]),
    ("kaas", &["pindakaas"]),
    ("boter", &["amandelboter", "cashewboter", "notenboter", "kokosboter", "cacaoboter"]),
    ("butter", &["peanut butter", "almond butter", "nut butter", "cocoa butter"]),
    ("cream", &["coconut cream"]),
    ("suiker", &["suikervrij"]),
    ("sugar", &["sugar-free", "sugar free"]),
];

/// Compound words containing `term` that are not that food. Empty for
/// terms without known compounds.
pub fn term_exclusions(term: &str) -> &'static [&'static str] {
    TERM_EXCLUSIONS
        .iter()
        .find(|(t, _)| *t == term)
        .map(|(_, excludes)| *excludes)
        .unwrap_or(&[])
}

/// Terms belonging to a category. Unknown categories have no terms; the
/// category name itself is then used as the only term by the compiler.
pub fn category_terms(category: &str) -> &'static [&'static str] {
    match category {
        GRAINS => GRAIN_TERMS,
        DAIRY => DAIRY_TERMS,
        LEGUMES => LEGUME_TERMS,
        PROCESSED_SUGAR => PROCESSED_SUGAR_TERMS,
        STARCHY_VEGETABLES => STARCHY_VEGETABLE_TERMS,
        HIGH_SUGAR_FRUIT => HIGH_SUGAR_FRUIT_TERMS,
        MEAT => MEAT_TERMS,
        PROCESSED_MEAT => PROCESSED_MEAT_TERMS,
        FISH => FISH_TERMS,
        EGGS => EGG_TERMS,
        HONEY => HONEY_TERMS,
        VEGETABLES => VEGETABLE_TERMS,
        OLIVE_OIL => OLIVE_OIL_TERMS,
        HEALTHY_FATS => HEALTHY_FAT_TERMS,
        ORGAN_MEAT => ORGAN_MEAT_TERMS,
        LEAFY_GREENS => LEAFY_GREEN_TERMS,
        SULFUR_VEGETABLES => SULFUR_VEGETABLE_TERMS,
        COLORED_VEGETABLES => COLORED_VEGETABLE_TERMS,
        PROTEIN => PROTEIN_TERMS,
        _ => &[],
    }
}

pub(crate) fn owned_terms(category: &str) -> Vec<String> {
    category_terms(category).iter().map(|t| t.to_string()).collect()
}

/// Lowercase, trim, and collapse inner whitespace.
pub fn normalize_term(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_categories_have_terms() {
        for category in [GRAINS, DAIRY, LEGUMES, PROCESSED_SUGAR, MEAT, FISH, LEAFY_GREENS] {
            assert!(!category_terms(category).is_empty(), "{category}");
        }
        assert!(category_terms("unobtainium").is_empty());
    }

    #[test]
    fn terms_are_normalized() {
        for category in [
            GRAINS, DAIRY, LEGUMES, PROCESSED_SUGAR, STARCHY_VEGETABLES, HIGH_SUGAR_FRUIT, MEAT,
            PROCESSED_MEAT, FISH, EGGS, HONEY, VEGETABLES, OLIVE_OIL, HEALTHY_FATS, ORGAN_MEAT,
            LEAFY_GREENS, SULFUR_VEGETABLES, COLORED_VEGETABLES, PROTEIN,
        ] {
            for term in category_terms(category) {
                assert_eq!(*term, normalize_term(term), "{category}: {term}");
            }
        }
    }

    #[test]
    fn egg_terms_do_not_hit_leek() {
        assert!(!category_terms(EGGS).iter().any(|t| "prei".contains(t)));
        assert!(!category_terms(MEAT).iter().any(|t| "champignons".contains(t)));
    }

    #[test]
    fn exclusions_belong_to_vocabulary_terms() {
        let all: Vec<&str> = [GRAINS, DAIRY, PROCESSED_SUGAR]
            .iter()
            .flat_map(|c| category_terms(c).iter().copied())
            .collect();
        for (term, excludes) in TERM_EXCLUSIONS {
            assert!(all.contains(term), "{term} is not a category term");
            for e in *excludes {
                assert!(e.contains(term), "{e} does not contain {term}");
                assert_eq!(*e, normalize_term(e));
            }
        }
        assert_eq!(term_exclusions("bloem"), &["bloemkool"]);
        assert!(term_exclusions("pinda").is_empty());
    }

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(normalize_term("  Zoete   Aardappel "), "zoete aardappel");
    }
}
