use serde::{Deserialize, Serialize};

pub type MaterialId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialType {
    Pdf,
    Video,
    Text,
    Presentation,
    Link,
}

impl MaterialType {
    pub fn label(self) -> &'static str {
        match self {
            MaterialType::Pdf => "PDF документ",
            MaterialType::Video => "Видео урок",
            MaterialType::Text => "Текстовый материал",
            MaterialType::Presentation => "Презентация",
            MaterialType::Link => "Ссылка",
        }
    }
}

/// A catalogued study material as supplied by the catalog. Read-only to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawMaterial")]
pub struct MaterialRecord {
    pub id: MaterialId,
    pub title: String,
    pub description: String,
    /// Comma-separated, possibly empty.
    pub tags: String,
    pub subject_name: String,
    pub material_type: Option<MaterialType>,
    pub material_type_label: String,
}

impl MaterialRecord {
    pub fn new(
        id: MaterialId,
        title: impl Into<String>,
        description: impl Into<String>,
        tags: impl Into<String>,
        subject_name: impl Into<String>,
        material_type: MaterialType,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            description: description.into(),
            tags: tags.into(),
            subject_name: subject_name.into(),
            material_type: Some(material_type),
            material_type_label: material_type.label().to_string(),
        }
    }

    pub fn tag_list(&self) -> impl Iterator<Item = &str> {
        self.tags.split(',').map(str::trim).filter(|t| !t.is_empty())
    }
}

/// Catalog wire shape: accepts either a `material_type` code or a ready-made label,
/// and tolerates null or missing text fields.
#[derive(Deserialize)]
struct RawMaterial {
    id: MaterialId,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    tags: Option<String>,
    #[serde(default, alias = "subject")]
    subject_name: Option<String>,
    #[serde(default)]
    material_type: Option<MaterialType>,
    #[serde(default)]
    material_type_label: Option<String>,
}

impl From<RawMaterial> for MaterialRecord {
    fn from(raw: RawMaterial) -> Self {
        let material_type_label = raw
            .material_type_label
            .or_else(|| raw.material_type.map(|t| t.label().to_string()))
            .unwrap_or_default();
        Self {
            id: raw.id,
            title: raw.title.unwrap_or_default(),
            description: raw.description.unwrap_or_default(),
            tags: raw.tags.unwrap_or_default(),
            subject_name: raw.subject_name.unwrap_or_default(),
            material_type: raw.material_type,
            material_type_label,
        }
    }
}
