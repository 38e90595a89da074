//! Stock vocabularies for the `main` and `personality` groups and the
//! default keyword catalogue that ships with them.

use super::group::{CategoryDef, CategoryGroup};
use super::rule_set::{KeywordRuleSet, RuleSetError};
use crate::types::identifiers::{CategoryCode, GroupId};

pub const MAIN_GROUP: &str = "main";
pub const PERSONALITY_GROUP: &str = "personality";

pub const DEFAULT: &str = "DEFAULT";
pub const CANNOT_PLACE: &str = "CANNOT_PLACE";

const MAIN_CATEGORIES: &[(&str, &str)] = &[
    ("BUSINESS_OPERATIONS", "Business Operations"),
    ("HEALTH", "Health"),
    ("SURVIVALIST", "Survivalist"),
    (DEFAULT, "Default"),
    (CANNOT_PLACE, "Cannot Place"),
];

const PERSONALITY_CATEGORIES: &[(&str, &str)] = &[
    ("DIGITAL_MARKETING", "Digital Marketing"),
    ("ENTREPRENEURSHIP", "Entrepreneurship"),
    ("FITNESS_NUTRITION", "Fitness & Nutrition"),
    ("HOLISTIC_WELLNESS", "Holistic Wellness"),
    ("INVESTING_FINANCE", "Investing & Finance"),
    ("LONGEVITY_HEALTH", "Longevity & Health"),
    ("MENTAL_EMOTIONAL", "Mental & Emotional Well-being"),
    ("SELF_RELIANCE", "Self-Reliance & Preparedness"),
    ("TARGETED_HEALTH", "Targeted Health Solutions"),
    ("WOMENS_HEALTH", "Women's Health"),
    (DEFAULT, "Default"),
    (CANNOT_PLACE, "Cannot Place"),
];

const MAIN_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "BUSINESS_OPERATIONS",
        &[
            "leadership summit", "2020 leadership", "2019 leadership", "ai mastery",
            "copywriting summit", "internet business formula", "speakerfest", "affiliate", "jv",
            "kbs", "mms summit", "hero summit", "nonfiction secrets", "publicity summit",
            "systems and marketing", "growth hacking", "webinar workshop", "online privacy",
            "prs summit", "advertiser", "business formula", "coachingfest", "client", "ceo",
            "founder", "customer", "sm 3.0 member", "lead generation", "attendee", "registrant",
            "registration", "masterclass", "six figure masterclass", "business affiliates",
        ],
    ),
    (
        "HEALTH",
        &[
            "health", "wellness", "medical", "nutrition", "fitness", "thyroid", "slimming",
            "diet", "keto", "essential oils", "eo summit", "doterra", "long covid", "emf",
            "hss attendee", "common sense reg", "ops registration", "trauma recovery",
            "holistic sleep", "got mold", "dog summit", "breathwork", "yoga", "kids brain",
            "chiro", "blood sugar", "energy blueprint", "ptsd", "save my thyroid", "doctor",
            "clinic", "healing", "therapy", "mental health", "emotional well-being", "emfhbm",
            "slimming registration", "slim down conference", "emf masterclass",
        ],
    ),
    (
        "SURVIVALIST",
        &[
            "survival", "preparedness", "emergency", "prepper", "self-reliance", "homesteading",
            "tactical", "bug out", "water system", "seed", "patriot", "food4patriots",
            "off-grid", "survival medical system", "shtf", "bunker", "first aid", "self-defense",
            "survival summit", "survivalist",
        ],
    ),
];

const PERSONALITY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "DIGITAL_MARKETING",
        &[
            "copywriting summit", "internet business formula", "nonfiction secrets",
            "publicity summit", "webinar workshop", "online privacy", "digital marketing",
            "content creation", "seo", "social media", "advertising", "email marketing",
            "funnels", "audience", "branding", "analytics", "growth hacking",
        ],
    ),
    (
        "ENTREPRENEURSHIP",
        &[
            "leadership summit", "kbs", "ai mastery", "six figure masterclass", "affiliate fest",
            "speakerfest", "coachingfest", "mms summit", "hero summit", "sm 3.0 member",
            "entrepreneur", "business development", "startup", "business growth", "sales",
            "founder", "ceo", "networking", "customer acquisition", "scaling",
            "systems and marketing", "business affiliates",
        ],
    ),
    (
        "FITNESS_NUTRITION",
        &[
            "fitness", "nutrition", "weight management", "slimming registration", "diet",
            "exercise", "keto", "sports", "training", "healthy eating", "fat loss",
            "bodybuilding", "slim down conference",
        ],
    ),
    (
        "HOLISTIC_WELLNESS",
        &[
            "hss attendee", "emfhmb registration", "emf masterclass", "trauma recovery",
            "essential oils", "eo summit", "holistic sleep", "breathwork summit",
            "yoga summit", "doterra", "energy blueprint", "holistic wellness", "natural living",
            "organic", "mindfulness", "meditation", "herbalism", "detox", "cleanse", "got mold",
        ],
    ),
    (
        "INVESTING_FINANCE",
        &[
            "investing", "finance", "wealth creation", "crypto", "bitcoin", "stocks", "forex",
            "real estate", "financial planning", "tax lien", "money", "trading", "assets",
            "passive income", "budgeting", "future of crypto",
        ],
    ),
    (
        "LONGEVITY_HEALTH",
        &[
            "longevity", "regenerative health", "anti-aging", "biohacking", "healthspan",
            "stem cells", "genetics", "long covid masterclass",
        ],
    ),
    (
        "MENTAL_EMOTIONAL",
        &[
            "mental health", "emotional well-being", "stress management", "psychology",
            "therapy", "trauma recovery", "mindset", "anxiety", "depression", "counseling",
            "self-care", "resilience", "ptsd masterclass", "holistic sleep",
        ],
    ),
    (
        "SELF_RELIANCE",
        &[
            "self-reliance", "preparedness", "survival", "homesteading", "emergency planning",
            "off-grid living", "prepper", "shtf", "bunker", "food storage", "water filtration",
            "first aid", "self-defense", "tactical gear", "survival medical system",
            "survivalist", "survival summit", "emfhbm",
        ],
    ),
    (
        "TARGETED_HEALTH",
        &[
            "thyroid", "save my thyroid", "long covid", "diabetes", "cancer", "autoimmune",
            "brain health", "kids brain reg", "gut health", "heart disease", "pain management",
            "chronic illness", "disease management", "medical treatment", "doctor", "clinic",
            "ops registration", "hss attendee", "dog summit",
        ],
    ),
    (
        "WOMENS_HEALTH",
        &[
            "women health", "motherhood", "pregnancy", "female health", "hormone balance women",
            "menopause", "fertility", "goddess", "she means business",
        ],
    ),
];

fn group(id: &str, categories: &[(&str, &str)]) -> Result<CategoryGroup, RuleSetError> {
    CategoryGroup::new(
        GroupId::from(id),
        categories
            .iter()
            .map(|(code, label)| CategoryDef::new(*code, *label))
            .collect(),
        CategoryCode::from(DEFAULT),
        CategoryCode::from(CANNOT_PLACE),
    )
}

fn rules(
    group: &CategoryGroup,
    catalogue: &[(&str, &[&str])],
) -> Result<KeywordRuleSet, RuleSetError> {
    KeywordRuleSet::new(
        group,
        catalogue
            .iter()
            .map(|(code, keywords)| (CategoryCode::from(*code), keywords.iter().copied())),
    )
}

pub fn main_group() -> Result<CategoryGroup, RuleSetError> {
    group(MAIN_GROUP, MAIN_CATEGORIES)
}

pub fn personality_group() -> Result<CategoryGroup, RuleSetError> {
    group(PERSONALITY_GROUP, PERSONALITY_CATEGORIES)
}

pub fn main_rules(group: &CategoryGroup) -> Result<KeywordRuleSet, RuleSetError> {
    rules(group, MAIN_KEYWORDS)
}

pub fn personality_rules(group: &CategoryGroup) -> Result<KeywordRuleSet, RuleSetError> {
    rules(group, PERSONALITY_KEYWORDS)
}
