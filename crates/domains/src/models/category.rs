use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
}

/// Categories every deployment starts with.
pub fn default_categories() -> Vec<NewCategory> {
    [
        (
            "Mural",
            "Large-scale artwork painted or applied directly on walls",
        ),
        ("Graffiti", "Street art created with spray paint or markers"),
        ("Sculpture", "Three-dimensional artworks"),
        (
            "Installation",
            "Site-specific, three-dimensional works designed to transform a space",
        ),
        ("Street Art", "Visual art created in public locations"),
        (
            "Digital Art",
            "Art made or presented using digital technology",
        ),
    ]
    .into_iter()
    .map(|(name, description)| NewCategory {
        name: name.to_string(),
        description: Some(description.to_string()),
    })
    .collect()
}
