//! Extracted entities and their deduplicated collection.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A labelled span detected by a token-classification model.
///
/// Serialized with the wire field names `entity`, `score`, `word`, `start`, `end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    #[serde(rename = "entity")]
    pub label: String,
    /// Confidence in `[0, 1]`.
    pub score: f64,
    #[serde(rename = "word")]
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl Entity {
    fn key(&self) -> EntityKey {
        // Collapse -0.0 onto 0.0 so the key agrees with f64 equality.
        let score = if self.score == 0.0 { 0.0 } else { self.score };
        (
            self.label.clone(),
            score.to_bits(),
            self.text.clone(),
            self.start,
            self.end,
        )
    }
}

type EntityKey = (String, u64, String, usize, usize);

/// Entities from every chunk of one document, without exact duplicates.
///
/// Two entities are the same only when label, score, text, start, and end
/// all match. A re-detection with a different score is kept. Iteration
/// follows first-seen order.
#[derive(Debug, Clone, Default)]
pub struct EntitySet {
    entities: Vec<Entity>,
    seen: HashSet<EntityKey>,
}

impl EntitySet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity; returns `false` if an identical one is already present.
    pub fn insert(&mut self, entity: Entity) -> bool {
        if self.seen.insert(entity.key()) {
            self.entities.push(entity);
            true
        } else {
            false
        }
    }

    /// Number of distinct entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// True when no entity has been added.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Entities in first-seen order.
    pub fn iter(&self) -> std::slice::Iter<'_, Entity> {
        self.entities.iter()
    }

    /// Entities in first-seen order, as a slice.
    pub fn as_slice(&self) -> &[Entity] {
        &self.entities
    }

    /// Consume the set, keeping first-seen order.
    pub fn into_vec(self) -> Vec<Entity> {
        self.entities
    }
}

impl PartialEq for EntitySet {
    fn eq(&self, other: &Self) -> bool {
        self.entities == other.entities
    }
}

impl Extend<Entity> for EntitySet {
    fn extend<I: IntoIterator<Item = Entity>>(&mut self, iter: I) {
        for entity in iter {
            self.insert(entity);
        }
    }
}

impl FromIterator<Entity> for EntitySet {
    fn from_iter<I: IntoIterator<Item = Entity>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<'a> IntoIterator for &'a EntitySet {
    type Item = &'a Entity;
    type IntoIter = std::slice::Iter<'a, Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entities.iter()
    }
}

impl Serialize for EntitySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.entities)
    }
}

impl<'de> Deserialize<'de> for EntitySet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entities = Vec::<Entity>::deserialize(deserializer)?;
        Ok(entities.into_iter().collect())
    }
}
