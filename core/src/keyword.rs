use crate::material::{MaterialId, MaterialRecord};

/// Plain case-insensitive substring match over title, description, tags and subject.
/// Used when ranked search is unavailable.
pub fn keyword_search(query: &str, materials: &[MaterialRecord]) -> Vec<MaterialId> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    materials
        .iter()
        .filter(|m| {
            [&m.title, &m.description, &m.tags, &m.subject_name]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        })
        .map(|m| m.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MaterialType;

    #[test]
    fn matches_any_field_in_input_order() {
        let materials = vec![
            MaterialRecord::new(3, "Mechanics", "Forces", "newton", "Physics", MaterialType::Pdf),
            MaterialRecord::new(1, "Optics", "Light", "", "Physics", MaterialType::Pdf),
            MaterialRecord::new(2, "Poetry", "Verse", "", "Literature", MaterialType::Text),
        ];
        assert_eq!(keyword_search("PHYSICS", &materials), vec![3, 1]);
        assert_eq!(keyword_search("newt", &materials), vec![3]);
        assert!(keyword_search("  ", &materials).is_empty());
    }
}
