//! # Label Type Registry
//!
//! A label type is a named preset of field visibility plus optional anchor
//! positions. The registry keeps an in-memory list backed by a
//! [`LabelTypeStore`] and always includes the built-in types.
//!
//! ## Built-in Types
//!
//! | Name | Fields |
//! |------|--------|
//! | Standart | all visible |
//! | Barkodsuz | barcode hidden |
//! | Sade | product name and barcode only |
//!
//! Built-ins have no `id`, cannot be deleted, and are listed first.
//!
//! ## Degraded Mode
//!
//! When the store cannot be read, [`Registry::load`] keeps the built-ins and
//! marks the registry degraded. The designer stays usable with the defaults;
//! saves and deletes still go to the store and fail there.
//!
//! ## Concurrency
//!
//! Writes are whole-record replacements. Two sessions saving the same type
//! end with whichever save arrived last.

mod store;

pub use store::{JsonFileStore, LabelTypeStore, RestStore};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{EtiketError, Result};
use crate::layout::{Anchors, FieldKey, FieldRule, FieldsConfig};

/// A persisted label type record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelTypeDef {
    /// `None` for built-in types.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub fields: FieldsConfig,
    #[serde(default)]
    pub anchors: Option<Anchors>,
}

impl LabelTypeDef {
    pub fn new(name: impl Into<String>, fields: FieldsConfig) -> Self {
        Self {
            id: None,
            name: name.into(),
            fields,
            anchors: None,
        }
    }

    pub fn is_built_in(&self) -> bool {
        self.id.is_none()
    }
}

/// The types that ship with the designer.
pub fn built_in() -> Vec<LabelTypeDef> {
    let mut plain = FieldsConfig::default();
    for key in FieldKey::ALL {
        if !matches!(key, FieldKey::ProductName | FieldKey::Barcode) {
            *plain.get_mut(key) = FieldRule::HIDDEN;
        }
    }

    vec![
        LabelTypeDef::new("Standart", FieldsConfig::default()),
        LabelTypeDef::new(
            "Barkodsuz",
            FieldsConfig::default().with(FieldKey::Barcode, FieldRule::HIDDEN),
        ),
        LabelTypeDef::new("Sade", plain),
    ]
}

/// Cached view over a label type store.
pub struct Registry {
    store: Box<dyn LabelTypeStore>,
    types: RwLock<Vec<LabelTypeDef>>,
    degraded: RwLock<bool>,
}

impl Registry {
    pub fn new(store: Box<dyn LabelTypeStore>) -> Self {
        Self {
            store,
            types: RwLock::new(built_in()),
            degraded: RwLock::new(false),
        }
    }

    /// Refresh from the store. On failure the built-ins are kept, the
    /// registry is marked degraded, and the error is returned for logging.
    pub async fn load(&self) -> Result<()> {
        match self.store.list().await {
            Ok(stored) => {
                let mut types = built_in();
                types.extend(stored.into_iter().filter(|t| t.id.is_some()));
                info!(count = types.len(), "loaded label types");
                *self.types.write().await = types;
                *self.degraded.write().await = false;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "label type store unavailable, using built-in types");
                *self.types.write().await = built_in();
                *self.degraded.write().await = true;
                Err(e)
            }
        }
    }

    pub async fn is_degraded(&self) -> bool {
        *self.degraded.read().await
    }

    pub async fn list(&self) -> Vec<LabelTypeDef> {
        self.types.read().await.clone()
    }

    /// Look up by id, or by name for built-ins.
    pub async fn get(&self, id_or_name: &str) -> Option<LabelTypeDef> {
        let types = self.types.read().await;
        types
            .iter()
            .find(|t| t.id.as_deref() == Some(id_or_name))
            .or_else(|| types.iter().find(|t| t.name == id_or_name))
            .cloned()
    }

    /// Create or replace a type. A missing id is assigned; names must be
    /// unique (case-insensitive) across built-in and stored types.
    pub async fn save(&self, mut def: LabelTypeDef) -> Result<LabelTypeDef> {
        let name = def.name.trim().to_string();
        if name.is_empty() {
            return Err(EtiketError::Registry("Label type name is empty".into()));
        }
        def.name = name;
        if def.id.as_deref().is_none_or(str::is_empty) {
            def.id = Some(Uuid::new_v4().to_string());
        }

        {
            let types = self.types.read().await;
            let clash = types.iter().any(|t| {
                t.id != def.id && t.name.to_lowercase() == def.name.to_lowercase()
            });
            if clash {
                return Err(EtiketError::Registry(format!(
                    "A label type named {:?} already exists",
                    def.name
                )));
            }
        }

        self.store.save(&def).await?;
        info!(id = def.id.as_deref().unwrap_or(""), name = %def.name, "saved label type");

        let mut types = self.types.write().await;
        match types.iter_mut().find(|t| t.id == def.id) {
            Some(existing) => *existing = def.clone(),
            None => types.push(def.clone()),
        }
        Ok(def)
    }

    /// Delete a stored type. Built-ins cannot be deleted.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let known = self
            .types
            .read()
            .await
            .iter()
            .any(|t| t.id.as_deref() == Some(id));
        if !known {
            let is_built_in = built_in().iter().any(|t| t.name == id);
            return Err(EtiketError::Registry(if is_built_in {
                format!("Built-in label type {:?} cannot be deleted", id)
            } else {
                format!("Unknown label type {:?}", id)
            }));
        }

        self.store.delete(id).await?;
        info!(id, "deleted label type");
        self.types
            .write()
            .await
            .retain(|t| t.id.as_deref() != Some(id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        types: Mutex<Vec<LabelTypeDef>>,
        offline: bool,
    }

    #[async_trait]
    impl LabelTypeStore for MemoryStore {
        async fn list(&self) -> Result<Vec<LabelTypeDef>> {
            if self.offline {
                return Err(EtiketError::Registry("offline".into()));
            }
            Ok(self.types.lock().unwrap().clone())
        }

        async fn save(&self, def: &LabelTypeDef) -> Result<()> {
            let mut types = self.types.lock().unwrap();
            types.retain(|t| t.id != def.id);
            types.push(def.clone());
            Ok(())
        }

        async fn delete(&self, id: &str) -> Result<()> {
            self.types
                .lock()
                .unwrap()
                .retain(|t| t.id.as_deref() != Some(id));
            Ok(())
        }
    }

    #[test]
    fn test_built_in_types() {
        let types = built_in();
        let names: Vec<&str> = types.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Standart", "Barkodsuz", "Sade"]);
        assert!(types.iter().all(LabelTypeDef::is_built_in));
        assert!(!types[1].fields.is_visible(FieldKey::Barcode));
        assert!(types[2].fields.is_visible(FieldKey::ProductName));
        assert!(!types[2].fields.is_visible(FieldKey::Amount));
    }

    #[test]
    fn test_record_json_shape() {
        let def: LabelTypeDef = serde_json::from_str(
            r#"{"id":"7","name":"Raf","fields":{"barcode":{"visible":false,"required":false}},
                "anchors":{"title":{"x":1,"y":2},"productName":{"x":6,"y":13},
                           "details":{"x":4,"y":24},"barcode":{"x":4,"y":52}}}"#,
        )
        .unwrap();
        assert_eq!(def.id.as_deref(), Some("7"));
        assert!(!def.fields.is_visible(FieldKey::Barcode));
        assert!(def.fields.is_visible(FieldKey::Amount));
        assert_eq!(def.anchors.unwrap().product_name.x_mm, 6.0);
    }

    #[tokio::test]
    async fn test_load_falls_back_when_offline() {
        let registry = Registry::new(Box::new(MemoryStore {
            offline: true,
            ..Default::default()
        }));
        assert!(registry.load().await.is_err());
        assert!(registry.is_degraded().await);
        assert_eq!(registry.list().await.len(), 3);
    }

    #[tokio::test]
    async fn test_save_assigns_id_and_enforces_unique_names() {
        let registry = Registry::new(Box::new(MemoryStore::default()));
        registry.load().await.unwrap();

        let saved = registry
            .save(LabelTypeDef::new("Raf Etiketi", FieldsConfig::default()))
            .await
            .unwrap();
        assert!(saved.id.is_some());
        assert_eq!(registry.list().await.len(), 4);

        let dup = registry
            .save(LabelTypeDef::new("raf etiketi", FieldsConfig::default()))
            .await;
        assert!(matches!(dup, Err(EtiketError::Registry(_))));
        let builtin_clash = registry
            .save(LabelTypeDef::new("Standart", FieldsConfig::default()))
            .await;
        assert!(builtin_clash.is_err());

        // Re-saving under the same id replaces (last write wins)
        let mut renamed = saved.clone();
        renamed.name = "Raf".into();
        registry.save(renamed).await.unwrap();
        let got = registry.get(saved.id.as_deref().unwrap()).await.unwrap();
        assert_eq!(got.name, "Raf");
        assert_eq!(registry.list().await.len(), 4);
    }

    #[tokio::test]
    async fn test_delete_rules() {
        let registry = Registry::new(Box::new(MemoryStore::default()));
        let saved = registry
            .save(LabelTypeDef::new("Koli", FieldsConfig::default()))
            .await
            .unwrap();

        assert!(registry.delete("Standart").await.is_err());
        assert!(registry.delete("nope").await.is_err());
        registry.delete(saved.id.as_deref().unwrap()).await.unwrap();
        assert!(registry.get("Koli").await.is_none());
        assert!(registry.get("Standart").await.is_some());
    }
}
