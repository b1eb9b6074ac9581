use crate::material::MaterialRecord;

pub const TITLE_REPEAT: usize = 3;
pub const SUBJECT_REPEAT: usize = 2;

/// Build the weighted, lower-cased text blob for one material.
///
/// The title is repeated three times and the subject name twice so their terms
/// carry more frequency than description and tag terms.
pub fn prepare_document(material: &MaterialRecord) -> String {
    let mut text = String::new();
    for _ in 0..TITLE_REPEAT {
        text.push_str(&material.title);
        text.push(' ');
    }
    text.push('\n');
    text.push_str(&material.description);
    text.push('\n');
    text.push_str(&material.tags);
    text.push('\n');
    for _ in 0..SUBJECT_REPEAT {
        text.push_str(&material.subject_name);
        text.push(' ');
    }
    text.push('\n');
    text.push_str(&material.material_type_label);
    text.to_lowercase()
}

pub fn prepare_documents(materials: &[MaterialRecord]) -> Vec<String> {
    materials.iter().map(prepare_document).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MaterialType;

    #[test]
    fn weights_title_and_subject() {
        let m = MaterialRecord::new(1, "Calculus I", "Limits", "", "Mathematics", MaterialType::Pdf);
        let doc = prepare_document(&m);
        assert_eq!(doc.matches("calculus").count(), 3);
        assert_eq!(doc.matches("mathematics").count(), 2);
        assert!(doc.ends_with("pdf документ"));
        assert_eq!(doc, doc.to_lowercase());
    }

    #[test]
    fn cyrillic_labels_are_lowercased_and_searchable() {
        let m = MaterialRecord::new(2, "Optics", "Lenses", "", "Physics", MaterialType::Text);
        let doc = prepare_document(&m);
        assert!(doc.ends_with("текстовый материал"));
        assert_eq!(crate::tokenizer::tokenize(&doc).last().map(String::as_str), Some("материал"));
    }
}
