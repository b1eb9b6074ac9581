#![allow(dead_code)]

use study_search::{MaterialRecord, MaterialType};

pub fn material(id: u64, title: &str, description: &str, tags: &str, subject: &str) -> MaterialRecord {
    MaterialRecord::new(id, title, description, tags, subject, MaterialType::Pdf)
}

/// The three-material catalog used throughout the engine tests.
pub fn scenario() -> Vec<MaterialRecord> {
    vec![
        material(1, "Linear Algebra Basics", "Intro to vectors and matrices", "math,algebra", "Mathematics"),
        material(2, "Calculus I", "Limits and derivatives", "math", "Mathematics"),
        material(3, "Physics Mechanics", "Newton's laws", "physics", "Physics"),
    ]
}

pub fn library() -> Vec<MaterialRecord> {
    vec![
        MaterialRecord::new(11, "Organic Chemistry", "Reactions of carbon compounds", "chemistry,organic", "Chemistry", MaterialType::Pdf),
        MaterialRecord::new(12, "Inorganic Chemistry", "Metals, salts and crystal structures", "chemistry", "Chemistry", MaterialType::Video),
        MaterialRecord::new(13, "Cell Biology", "Membranes, organelles and cell division", "biology,cells", "Biology", MaterialType::Text),
        MaterialRecord::new(14, "Genetics", "Inheritance, DNA and gene expression", "biology,dna", "Biology", MaterialType::Presentation),
        MaterialRecord::new(15, "World History", "Ancient empires and medieval kingdoms", "history", "History", MaterialType::Link),
        MaterialRecord::new(16, "Probability Theory", "Random variables and distributions", "math,statistics", "Mathematics", MaterialType::Pdf),
        MaterialRecord::new(17, "Linear Algebra Workbook", "Exercises on matrices and determinants", "math,algebra", "Mathematics", MaterialType::Text),
        MaterialRecord::new(18, "Thermodynamics", "Heat, entropy and engines", "physics,heat", "Physics", MaterialType::Video),
    ]
}
