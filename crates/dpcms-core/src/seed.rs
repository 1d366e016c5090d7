//! Default records
//!
//! Written to an empty store on first load. The set spans every content
//! type except `advice` and doubles as fixture data in tests.

use std::collections::BTreeSet;

use chrono::Utc;

use crate::models::{
    AgeGroup, ContentRecord, ContentType, Gender, Metadata, Onset, Prevalence, Severity, Status,
    Urgency,
};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn ages(groups: &[AgeGroup]) -> BTreeSet<AgeGroup> {
    groups.iter().copied().collect()
}

/// The five seeded records, ids "1" through "5", all stamped with the current time
pub fn default_records() -> Vec<ContentRecord> {
    let now = Utc::now();

    vec![
        ContentRecord {
            id: "1".to_string(),
            kind: ContentType::Disclaimer,
            title: "Medical Disclaimer".to_string(),
            body: "This tool provides general health information only and is not a substitute \
                   for professional medical advice, diagnosis, or treatment. Always consult your \
                   doctor for medical concerns."
                .to_string(),
            short_description: Some("Legal disclaimer for medical information".to_string()),
            detailed_description: Some(
                "Comprehensive legal disclaimer explaining the limitations of the medical \
                 information provided by this application."
                    .to_string(),
            ),
            metadata: Metadata {
                category: Some("legal".to_string()),
                tags: strings(&["disclaimer", "legal", "medical"]),
                author: "Legal Team".to_string(),
                reviewed_by: Some("Chief Medical Officer".to_string()),
                medically_reviewed: true,
                version: 1,
                status: Status::Approved,
                region: Some("global".to_string()),
                last_updated: now,
                ..Metadata::default()
            },
        },
        ContentRecord {
            id: "2".to_string(),
            kind: ContentType::Condition,
            title: "Common Cold".to_string(),
            body: "A viral infection of the upper respiratory tract causing mild to moderate \
                   symptoms."
                .to_string(),
            short_description: Some("Viral upper respiratory infection".to_string()),
            detailed_description: Some(
                "The common cold is a viral infection that affects the nose, throat, and upper \
                 respiratory system. It is one of the most frequent illnesses, especially during \
                 colder months."
                    .to_string(),
            ),
            metadata: Metadata {
                urgency: Some(Urgency::Monitor),
                severity: Some(Severity::Mild),
                category: Some("respiratory".to_string()),
                subcategory: Some("viral infections".to_string()),
                tags: strings(&["viral", "respiratory", "common", "contagious"]),
                symptoms: strings(&[
                    "runny nose",
                    "sneezing",
                    "cough",
                    "sore throat",
                    "mild headache",
                ]),
                related_conditions: strings(&["flu", "sinusitis", "bronchitis"]),
                age_groups: ages(&[
                    AgeGroup::Child,
                    AgeGroup::Teen,
                    AgeGroup::Adult,
                    AgeGroup::Elderly,
                ]),
                gender: Some(Gender::Both),
                prevalence: Some(Prevalence::Common),
                duration: Some("7-10 days".to_string()),
                onset: Some(Onset::Gradual),
                triggers: strings(&[
                    "cold weather",
                    "stress",
                    "lack of sleep",
                    "close contact with infected person",
                ]),
                risk_factors: strings(&[
                    "weakened immune system",
                    "age under 6",
                    "crowded environments",
                ]),
                complications: strings(&["sinusitis", "ear infection", "bronchitis"]),
                when_to_seek_help: strings(&[
                    "fever over 101.3°F",
                    "symptoms lasting more than 10 days",
                    "severe headache",
                    "difficulty breathing",
                ]),
                home_remedies: strings(&["rest", "fluids", "warm salt water gargle", "humidifier"]),
                medications: strings(&["acetaminophen", "ibuprofen", "decongestants"]),
                lifestyle: strings(&["hand washing", "avoid touching face", "get adequate sleep"]),
                prevention: strings(&[
                    "frequent hand washing",
                    "avoid close contact with sick people",
                    "maintain healthy lifestyle",
                ]),
                follow_up: Some(
                    "Monitor symptoms and seek medical care if they worsen or persist beyond 10 days"
                        .to_string(),
                ),
                sources: strings(&["CDC", "Mayo Clinic", "WHO"]),
                author: "Dr. Sarah Johnson".to_string(),
                reviewed_by: Some("Medical Review Board".to_string()),
                medically_reviewed: true,
                version: 2,
                status: Status::Approved,
                region: Some("global".to_string()),
                last_updated: now,
                ..Metadata::default()
            },
        },
        ContentRecord {
            id: "3".to_string(),
            kind: ContentType::Symptom,
            title: "Persistent Headache".to_string(),
            body: "Ongoing head pain that lasts for several hours or days, potentially indicating \
                   various underlying conditions."
                .to_string(),
            short_description: Some("Continuous head pain requiring evaluation".to_string()),
            detailed_description: Some(
                "A persistent headache is characterized by continuous or recurring head pain that \
                 may vary in intensity and location. It can be a symptom of various conditions \
                 ranging from tension to more serious medical issues."
                    .to_string(),
            ),
            metadata: Metadata {
                urgency: Some(Urgency::Moderate),
                severity: Some(Severity::Moderate),
                category: Some("neurological".to_string()),
                subcategory: Some("pain".to_string()),
                tags: strings(&["headache", "pain", "neurological", "chronic"]),
                related_conditions: strings(&[
                    "migraine",
                    "tension headache",
                    "cluster headache",
                    "sinusitis",
                ]),
                age_groups: ages(&[AgeGroup::Teen, AgeGroup::Adult, AgeGroup::Elderly]),
                gender: Some(Gender::Both),
                prevalence: Some(Prevalence::Common),
                duration: Some("variable".to_string()),
                onset: Some(Onset::Gradual),
                triggers: strings(&[
                    "stress",
                    "dehydration",
                    "lack of sleep",
                    "eye strain",
                    "certain foods",
                ]),
                risk_factors: strings(&[
                    "stress",
                    "poor posture",
                    "irregular sleep",
                    "dehydration",
                ]),
                complications: strings(&[
                    "medication overuse headache",
                    "chronic daily headache",
                ]),
                when_to_seek_help: strings(&[
                    "sudden severe headache",
                    "headache with fever",
                    "vision changes",
                    "confusion",
                ]),
                home_remedies: strings(&[
                    "rest in dark room",
                    "cold/warm compress",
                    "hydration",
                    "gentle massage",
                ]),
                medications: strings(&["acetaminophen", "ibuprofen", "aspirin"]),
                lifestyle: strings(&[
                    "regular sleep schedule",
                    "stress management",
                    "proper hydration",
                ]),
                prevention: strings(&[
                    "stress management",
                    "regular exercise",
                    "adequate sleep",
                    "proper nutrition",
                ]),
                follow_up: Some(
                    "Keep headache diary and consult doctor if frequency increases".to_string(),
                ),
                sources: strings(&["American Headache Society", "Mayo Clinic"]),
                author: "Dr. Michael Chen".to_string(),
                reviewed_by: Some("Neurology Department".to_string()),
                medically_reviewed: true,
                version: 1,
                status: Status::Approved,
                last_updated: now,
                ..Metadata::default()
            },
        },
        ContentRecord {
            id: "4".to_string(),
            kind: ContentType::Treatment,
            title: "Hydration Therapy".to_string(),
            body: "Systematic approach to maintaining proper fluid balance in the body to support \
                   recovery and prevent complications."
                .to_string(),
            short_description: Some("Fluid replacement and maintenance therapy".to_string()),
            detailed_description: Some(
                "Hydration therapy involves the careful management of fluid intake to maintain \
                 proper electrolyte balance and support the body's natural healing processes."
                    .to_string(),
            ),
            metadata: Metadata {
                category: Some("supportive care".to_string()),
                subcategory: Some("fluid management".to_string()),
                tags: strings(&["hydration", "fluids", "electrolytes", "supportive care"]),
                age_groups: ages(AgeGroup::ALL),
                gender: Some(Gender::Both),
                prevalence: Some(Prevalence::Common),
                duration: Some("as needed".to_string()),
                when_to_seek_help: strings(&[
                    "signs of severe dehydration",
                    "inability to keep fluids down",
                    "decreased urination",
                ]),
                home_remedies: strings(&[
                    "water",
                    "electrolyte solutions",
                    "clear broths",
                    "herbal teas",
                ]),
                lifestyle: strings(&[
                    "regular fluid intake",
                    "monitor urine color",
                    "increase intake during illness",
                ]),
                prevention: strings(&[
                    "regular water intake",
                    "limit caffeine and alcohol",
                    "increase fluids in hot weather",
                ]),
                follow_up: Some("Monitor hydration status and adjust intake as needed".to_string()),
                sources: strings(&["WHO", "CDC", "American Academy of Pediatrics"]),
                author: "Dr. Lisa Rodriguez".to_string(),
                reviewed_by: Some("Emergency Medicine Department".to_string()),
                medically_reviewed: true,
                version: 1,
                status: Status::Approved,
                last_updated: now,
                ..Metadata::default()
            },
        },
        ContentRecord {
            id: "5".to_string(),
            kind: ContentType::Prevention,
            title: "Hand Hygiene Protocol".to_string(),
            body: "Comprehensive hand washing and sanitization practices to prevent the spread of \
                   infectious diseases."
                .to_string(),
            short_description: Some(
                "Proper hand cleaning techniques for infection prevention".to_string(),
            ),
            detailed_description: Some(
                "Hand hygiene is one of the most effective ways to prevent the spread of \
                 infections. This protocol outlines proper techniques for hand washing and \
                 sanitization."
                    .to_string(),
            ),
            metadata: Metadata {
                category: Some("infection control".to_string()),
                subcategory: Some("hygiene".to_string()),
                tags: strings(&[
                    "hand washing",
                    "hygiene",
                    "infection prevention",
                    "sanitization",
                ]),
                age_groups: ages(&[
                    AgeGroup::Child,
                    AgeGroup::Teen,
                    AgeGroup::Adult,
                    AgeGroup::Elderly,
                ]),
                gender: Some(Gender::Both),
                prevalence: Some(Prevalence::Common),
                duration: Some("20 seconds minimum".to_string()),
                triggers: strings(&[
                    "before eating",
                    "after bathroom use",
                    "after coughing/sneezing",
                    "after touching surfaces",
                ]),
                prevention: strings(&[
                    "regular hand washing",
                    "alcohol-based sanitizer",
                    "avoid touching face",
                ]),
                lifestyle: strings(&[
                    "carry hand sanitizer",
                    "teach children proper technique",
                    "make it a habit",
                ]),
                sources: strings(&["CDC", "WHO", "FDA"]),
                author: "Infection Control Team".to_string(),
                reviewed_by: Some("Public Health Department".to_string()),
                medically_reviewed: true,
                version: 3,
                status: Status::Approved,
                region: Some("global".to_string()),
                last_updated: now,
                ..Metadata::default()
            },
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seed_has_five_unique_records() {
        let records = default_records();
        assert_eq!(records.len(), 5);

        let ids: HashSet<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn test_seed_one_condition() {
        let records = default_records();
        let conditions: Vec<_> = records
            .iter()
            .filter(|r| r.kind == ContentType::Condition)
            .collect();
        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].title, "Common Cold");
    }

    #[test]
    fn test_seed_records_have_authors() {
        for record in default_records() {
            assert!(!record.metadata.author.trim().is_empty(), "{}", record.id);
            assert_eq!(record.metadata.status, Status::Approved);
        }
    }
}
