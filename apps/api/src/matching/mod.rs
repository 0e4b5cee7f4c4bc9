// Skill matching: the injected taxonomy, keyword classification and skill inference.

pub mod classifier;
pub mod inference;
pub mod taxonomy;
pub mod text;
