use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::IdeasError;

/// Stable in-memory identity of an idea. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdeaId(Uuid);

impl IdeaId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for IdeaId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IdeaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable in-memory identity of a feature. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeatureId(Uuid);

impl FeatureId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FeatureId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FeatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A free-text line item belonging to exactly one idea
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feature {
    pub id: FeatureId,
    pub text: String,
}

impl Feature {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: FeatureId::new(),
            text: text.into(),
        }
    }
}

/// On-disk shape of an idea: `{"name": ..., "features": [...]}`
#[derive(Debug, Clone, Serialize, Deserialize)]
struct IdeaRecord {
    name: String,
    #[serde(default)]
    features: Vec<String>,
}

/// A named project idea holding an ordered list of features
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "IdeaRecord", into = "IdeaRecord")]
pub struct Idea {
    pub id: IdeaId,
    pub name: String,
    pub features: Vec<Feature>,
}

impl Idea {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: IdeaId::new(),
            name: name.into(),
            features: Vec::new(),
        }
    }

    /// Feature texts in list order
    pub fn feature_texts(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(|f| f.text.as_str())
    }

    fn feature_mut(&mut self, feature: FeatureId) -> Result<&mut Feature, IdeasError> {
        let idea = self.id;
        self.features
            .iter_mut()
            .find(|f| f.id == feature)
            .ok_or(IdeasError::FeatureNotFound { idea, feature })
    }

    fn feature_position(&self, feature: FeatureId) -> Result<usize, IdeasError> {
        self.features
            .iter()
            .position(|f| f.id == feature)
            .ok_or(IdeasError::FeatureNotFound {
                idea: self.id,
                feature,
            })
    }

    fn feature_id_at(&self, position: usize) -> Result<FeatureId, IdeasError> {
        self.features
            .get(position)
            .map(|f| f.id)
            .ok_or(IdeasError::FeatureIndexOutOfRange {
                position,
                len: self.features.len(),
            })
    }
}

impl From<IdeaRecord> for Idea {
    fn from(record: IdeaRecord) -> Self {
        Self {
            id: IdeaId::new(),
            name: record.name,
            features: record.features.into_iter().map(Feature::new).collect(),
        }
    }
}

impl From<Idea> for IdeaRecord {
    fn from(idea: Idea) -> Self {
        Self {
            name: idea.name,
            features: idea.features.into_iter().map(|f| f.text).collect(),
        }
    }
}

/// The ordered list of ideas.
///
/// The list is kept sorted by name (case-sensitive, byte-wise, stable for
/// equal names) after every mutation, so positions handed out before a
/// mutation are not valid after it. Prefer the id-addressed operations;
/// the `*_at` variants address ideas by their position in the current list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Idea>", into = "Vec<Idea>")]
pub struct IdeaStore {
    ideas: Vec<Idea>,
}

impl From<Vec<Idea>> for IdeaStore {
    fn from(ideas: Vec<Idea>) -> Self {
        Self::from_ideas(ideas)
    }
}

impl From<IdeaStore> for Vec<Idea> {
    fn from(store: IdeaStore) -> Self {
        store.ideas
    }
}

impl IdeaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from loaded ideas, establishing the sort order
    pub fn from_ideas(ideas: Vec<Idea>) -> Self {
        let mut store = Self { ideas };
        store.sort_by_name();
        store
    }

    pub fn ideas(&self) -> &[Idea] {
        &self.ideas
    }

    pub fn len(&self) -> usize {
        self.ideas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ideas.is_empty()
    }

    pub fn get(&self, id: IdeaId) -> Option<&Idea> {
        self.ideas.iter().find(|i| i.id == id)
    }

    /// Current position of an idea in the sorted list
    pub fn position_of(&self, id: IdeaId) -> Option<usize> {
        self.ideas.iter().position(|i| i.id == id)
    }

    /// Resolves a position in the current list to a stable id
    pub fn id_at(&self, position: usize) -> Result<IdeaId, IdeasError> {
        self.ideas
            .get(position)
            .map(|i| i.id)
            .ok_or(IdeasError::IdeaIndexOutOfRange {
                position,
                len: self.ideas.len(),
            })
    }

    /// First idea (in sort order) with exactly this name
    pub fn find_by_name(&self, name: &str) -> Option<&Idea> {
        self.ideas.iter().find(|i| i.name == name)
    }

    fn idea_mut(&mut self, id: IdeaId) -> Result<&mut Idea, IdeasError> {
        self.ideas
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(IdeasError::IdeaNotFound(id))
    }

    fn sort_by_name(&mut self) {
        self.ideas.sort_by(|a, b| a.name.cmp(&b.name));
    }

    // =========================================================================
    // Id-addressed operations
    // =========================================================================

    /// Adds a new idea with no features. Duplicate names are allowed.
    pub fn add_idea(&mut self, name: impl Into<String>) -> IdeaId {
        let idea = Idea::new(name);
        let id = idea.id;
        self.ideas.push(idea);
        self.sort_by_name();
        id
    }

    pub fn rename_idea(&mut self, id: IdeaId, name: impl Into<String>) -> Result<(), IdeasError> {
        self.idea_mut(id)?.name = name.into();
        self.sort_by_name();
        Ok(())
    }

    /// Removes an idea, returning it
    pub fn delete_idea(&mut self, id: IdeaId) -> Result<Idea, IdeasError> {
        let position = self.position_of(id).ok_or(IdeasError::IdeaNotFound(id))?;
        Ok(self.ideas.remove(position))
    }

    /// Appends a feature to an idea's list
    pub fn add_feature(
        &mut self,
        idea: IdeaId,
        text: impl Into<String>,
    ) -> Result<FeatureId, IdeasError> {
        let feature = Feature::new(text);
        let id = feature.id;
        self.idea_mut(idea)?.features.push(feature);
        Ok(id)
    }

    pub fn rename_feature(
        &mut self,
        idea: IdeaId,
        feature: FeatureId,
        text: impl Into<String>,
    ) -> Result<(), IdeasError> {
        self.idea_mut(idea)?.feature_mut(feature)?.text = text.into();
        Ok(())
    }

    /// Removes a feature, returning its text
    pub fn delete_feature(
        &mut self,
        idea: IdeaId,
        feature: FeatureId,
    ) -> Result<String, IdeasError> {
        let idea = self.idea_mut(idea)?;
        let position = idea.feature_position(feature)?;
        Ok(idea.features.remove(position).text)
    }

    // =========================================================================
    // Position-addressed operations
    // =========================================================================

    pub fn rename_idea_at(
        &mut self,
        position: usize,
        name: impl Into<String>,
    ) -> Result<(), IdeasError> {
        let id = self.id_at(position)?;
        self.rename_idea(id, name)
    }

    pub fn delete_idea_at(&mut self, position: usize) -> Result<Idea, IdeasError> {
        let id = self.id_at(position)?;
        self.delete_idea(id)
    }

    pub fn add_feature_at(
        &mut self,
        position: usize,
        text: impl Into<String>,
    ) -> Result<FeatureId, IdeasError> {
        let id = self.id_at(position)?;
        self.add_feature(id, text)
    }

    pub fn rename_feature_at(
        &mut self,
        idea_position: usize,
        feature_position: usize,
        text: impl Into<String>,
    ) -> Result<(), IdeasError> {
        let (idea, feature) = self.feature_ids_at(idea_position, feature_position)?;
        self.rename_feature(idea, feature, text)
    }

    pub fn delete_feature_at(
        &mut self,
        idea_position: usize,
        feature_position: usize,
    ) -> Result<String, IdeasError> {
        let (idea, feature) = self.feature_ids_at(idea_position, feature_position)?;
        self.delete_feature(idea, feature)
    }

    fn feature_ids_at(
        &self,
        idea_position: usize,
        feature_position: usize,
    ) -> Result<(IdeaId, FeatureId), IdeasError> {
        let idea = self.id_at(idea_position)?;
        let feature = self.ideas[idea_position].feature_id_at(feature_position)?;
        Ok((idea, feature))
    }
}

/// Returns the text as typed, or `None` when it is empty or only whitespace.
///
/// Callers use this to discard empty prompt input before touching the store.
pub fn non_empty(text: &str) -> Option<&str> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(store: &IdeaStore) -> Vec<&str> {
        store.ideas().iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn test_add_idea_keeps_name_order() {
        let mut store = IdeaStore::new();
        store.add_idea("Zeta");
        store.add_idea("Alpha");
        store.add_idea("Mid");

        assert_eq!(names(&store), vec!["Alpha", "Mid", "Zeta"]);
    }

    #[test]
    fn test_sort_is_case_sensitive() {
        let mut store = IdeaStore::new();
        store.add_idea("apple");
        store.add_idea("Banana");

        // Uppercase sorts before lowercase
        assert_eq!(names(&store), vec!["Banana", "apple"]);
    }

    #[test]
    fn test_duplicate_names_allowed() {
        let mut store = IdeaStore::new();
        let first = store.add_idea("Same");
        let second = store.add_idea("Same");

        assert_eq!(store.len(), 2);
        assert_ne!(first, second);
        // Stable sort keeps insertion order for equal names
        assert_eq!(store.id_at(0).unwrap(), first);
        assert_eq!(store.id_at(1).unwrap(), second);
    }

    #[test]
    fn test_rename_idea_resorts() {
        let mut store = IdeaStore::new();
        let alpha = store.add_idea("Alpha");
        store.add_idea("Beta");

        store.rename_idea(alpha, "Gamma").unwrap();

        assert_eq!(names(&store), vec!["Beta", "Gamma"]);
        assert_eq!(store.position_of(alpha), Some(1));
    }

    #[test]
    fn test_feature_operations() {
        let mut store = IdeaStore::new();
        let idea = store.add_idea("Website");

        let login = store.add_feature(idea, "Login page").unwrap();
        let search = store.add_feature(idea, "Search").unwrap();
        store.rename_feature(idea, login, "Sign-in page").unwrap();

        let texts: Vec<&str> = store.get(idea).unwrap().feature_texts().collect();
        assert_eq!(texts, vec!["Sign-in page", "Search"]);

        let removed = store.delete_feature(idea, search).unwrap();
        assert_eq!(removed, "Search");
        assert_eq!(store.get(idea).unwrap().features.len(), 1);
    }

    #[test]
    fn test_features_keep_insertion_order() {
        let mut store = IdeaStore::new();
        store.add_idea("Website");
        store.add_feature_at(0, "Zebra stripes").unwrap();
        store.add_feature_at(0, "Apple pie").unwrap();

        let texts: Vec<&str> = store.ideas()[0].feature_texts().collect();
        assert_eq!(texts, vec!["Zebra stripes", "Apple pie"]);
    }

    #[test]
    fn test_positional_operations() {
        let mut store = IdeaStore::new();
        store.add_idea("B");
        store.add_idea("A");

        store.add_feature_at(1, "b1").unwrap();
        store.rename_feature_at(1, 0, "b1 renamed").unwrap();
        assert_eq!(store.ideas()[1].features[0].text, "b1 renamed");

        store.delete_feature_at(1, 0).unwrap();
        assert!(store.ideas()[1].features.is_empty());

        let removed = store.delete_idea_at(0).unwrap();
        assert_eq!(removed.name, "A");
        assert_eq!(names(&store), vec!["B"]);
    }

    #[test]
    fn test_out_of_range_positions_are_rejected() {
        let mut store = IdeaStore::new();

        assert_eq!(
            store.delete_idea_at(0).unwrap_err(),
            IdeasError::IdeaIndexOutOfRange { position: 0, len: 0 }
        );

        store.add_idea("Only");
        assert_eq!(
            store.delete_feature_at(0, 3).unwrap_err(),
            IdeasError::FeatureIndexOutOfRange { position: 3, len: 0 }
        );
        assert!(store.rename_idea_at(5, "x").is_err());
        assert_eq!(names(&store), vec!["Only"]);
    }

    #[test]
    fn test_unknown_ids_are_rejected() {
        let mut store = IdeaStore::new();
        let idea = store.add_idea("Known");
        let stranger = IdeaId::new();

        assert_eq!(
            store.delete_idea(stranger).unwrap_err(),
            IdeasError::IdeaNotFound(stranger)
        );
        let missing = FeatureId::new();
        assert!(matches!(
            store.rename_feature(idea, missing, "x"),
            Err(IdeasError::FeatureNotFound { .. })
        ));
    }

    #[test]
    fn test_serializes_as_plain_records() {
        let mut store = IdeaStore::new();
        let idea = store.add_idea("Website");
        store.add_feature(idea, "Login page").unwrap();

        let json = serde_json::to_string(&store).unwrap();
        assert_eq!(json, r#"[{"name":"Website","features":["Login page"]}]"#);
    }

    #[test]
    fn test_missing_features_key_loads_empty() {
        let store: IdeaStore = serde_json::from_str(r#"[{"name":"Bare"}]"#).unwrap();
        assert_eq!(store.ideas()[0].name, "Bare");
        assert!(store.ideas()[0].features.is_empty());
    }

    #[test]
    fn test_deserialized_store_is_sorted() {
        let mut store: IdeaStore =
            serde_json::from_str(r#"[{"name":"b"},{"name":"a"}]"#).unwrap();
        let names: Vec<&str> = store.ideas().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);

        assert_eq!(store.delete_idea_at(0).unwrap().name, "a");
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty("  hello "), Some("  hello "));
        assert_eq!(non_empty("   "), None);
        assert_eq!(non_empty(""), None);
    }
}
