//! `POST LearningMaterials`.
//!
//! The backend does not yet check language ids or the picture's media type,
//! so those cases carry a known defect.

use serde_json::{Value, json};

use crate::environment::{HarnessConfig, Resource};
use crate::http::response::ResponseOutcome;
use crate::testing::case::{KnownDefect, OK, TestCase};
use crate::testing::runner::{Operation, Suite};
use crate::testing::schema::{FieldRule, FieldType, Schema, Shape};

use super::{VALIDATION, auth_cases};

pub const TITLE: &str = "Contract test material";
pub const MAX_TITLE: usize = 200;

/// 1x1 transparent PNG.
pub const PNG_PICTURE: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";
const TEXT_PICTURE: &str = "data:text/plain;base64,dGV4dA==";

pub fn suite() -> Suite {
    Suite {
        name: "learning_materials",
        resource: Resource::LearningMaterials,
        operation: Operation::Create,
        protected: true,
        check_options: false,
        cases,
        shape: Some(shape),
        invariant: Some(echoes_text),
        seed: None,
    }
}

/// A valid material of the given type; type 1 needs a picture.
pub fn payload(material_type: i64, picture: &str) -> Value {
    json!({
        "title": TITLE,
        "description": "",
        "targetLanguageId": 1,
        "writtenLanguageId": 1,
        "categoryId": 1,
        "tags": "",
        "content": "Lesson text",
        "picture": picture,
        "parentId": null,
        "topParentId": null,
        "allowAiComment": false,
        "materialType": material_type,
        "commentsCount": 0,
        "isCommentsAllowed": true,
        "user": null,
    })
}

/// Seed for the suites that address one material.
pub fn seed() -> Value {
    payload(2, "")
}

fn unchecked(what: &str) -> KnownDefect {
    KnownDefect::new(&[OK], format!("{what} is saved without validation"))
}

pub fn cases(_config: &HarnessConfig) -> Vec<TestCase> {
    let material = |label: &str, expected: &[u16], material_type: i64, picture: &str| {
        TestCase::new(label, expected).payload(payload(material_type, picture))
    };

    let mut cases = vec![
        material("material_type_1_png", &[OK], 1, PNG_PICTURE),
        material("material_type_2", &[OK], 2, ""),
        material("material_type_3", &[OK], 3, ""),
    ];
    cases.extend(auth_cases(|label, expected| material(label, expected, 2, "")));
    cases.extend([
        material("empty_title", VALIDATION, 2, "")
            .field("title", json!(""))
            .error_contains("title"),
        material("oversize_title", VALIDATION, 2, "").field("title", json!("s".repeat(MAX_TITLE + 1))),
        material("zero_target_language", VALIDATION, 2, "")
            .field("targetLanguageId", json!(0))
            .known_defect(unchecked("targetLanguageId = 0")),
        material("zero_written_language", VALIDATION, 2, "")
            .field("writtenLanguageId", json!(0))
            .known_defect(unchecked("writtenLanguageId = 0")),
        material("picture_text_file", VALIDATION, 1, TEXT_PICTURE).known_defect(unchecked("a text/plain picture")),
    ]);
    cases
}

pub fn shape() -> Shape {
    let id = || vec![FieldType::Integer];
    let text = || vec![FieldType::Text];
    let mut schema = Schema::new([
        FieldRule::required("id", id()),
        FieldRule::required("title", text()),
        FieldRule::required("materialType", id()),
    ]);
    for name in ["userId", "targetLanguageId", "writtenLanguageId", "categoryId", "parentId", "topParentId", "commentsCount"] {
        schema = schema.rule(FieldRule::optional(name, id()));
    }
    for name in ["description", "tags", "content", "publishDate", "updateDate", "picture", "thumbnail"] {
        schema = schema.rule(FieldRule::optional(name, text()));
    }
    for name in ["isCommentsAllowed", "allowAiComment"] {
        schema = schema.rule(FieldRule::optional(name, [FieldType::Boolean]));
    }
    Shape::Object(schema.rule(FieldRule::optional(
        "childrens",
        [FieldType::List(Box::new(FieldType::Object(Schema::default())))],
    )))
}

/// Title, description and content come back as sent.
pub fn echoes_text(case: &TestCase, outcome: &ResponseOutcome) -> Vec<String> {
    ["title", "description", "content"]
        .into_iter()
        .filter_map(|name| {
            let sent = case.payload_field(name)?;
            let echoed = outcome.field(name).unwrap_or(&Value::Null);
            (echoed != sent).then(|| format!("`{name}` echoed as {echoed}, sent {sent}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::testing::case::ensure_unique_labels;

    #[test]
    fn table_is_well_formed() {
        let table = cases(&HarnessConfig::default());
        assert_eq!(table.len(), 10);
        ensure_unique_labels(&table).unwrap();
        let unchecked: Vec<_> = table.iter().filter(|case| case.defect().is_some()).map(TestCase::label).collect();
        assert_eq!(unchecked, ["zero_target_language", "zero_written_language", "picture_text_file"]);
    }

    #[test]
    fn oversize_title_is_one_past_the_limit() {
        let table = cases(&HarnessConfig::default());
        let case = table.iter().find(|case| case.label() == "oversize_title").unwrap();
        let title = case.payload_field("title").and_then(Value::as_str).unwrap();
        assert_eq!(title.len(), MAX_TITLE + 1);
        assert_eq!(case.payload_field("materialType"), Some(&json!(2)));
    }

    #[test]
    fn echo_catches_a_rewritten_title() {
        let case = TestCase::new("x", &[OK]).payload(seed());
        let mut echoed = seed();
        echoed["id"] = json!(5);
        echoed["title"] = json!("Other");
        let outcome = ResponseOutcome::new(200, BTreeMap::new(), echoed.to_string());

        assert_eq!(
            echoes_text(&case, &outcome),
            vec![format!("`title` echoed as \"Other\", sent \"{TITLE}\"")]
        );
        assert!(shape().validate(&echoed).is_empty());
    }
}
