//! Providers that build lists, objects and files from other providers

use crate::error::{ProviderError, ProviderResult};
use crate::provider::{BoxProvider, Provider};
use ae_core::{is_valid_property_name, AutomationData, FileValue, Value};
use async_trait::async_trait;
use indexmap::IndexMap;

/// Resolves each item provider into a list
#[derive(Debug)]
pub struct ListProvider {
    items: Vec<BoxProvider<Value>>,
}

impl ListProvider {
    pub fn new(items: Vec<BoxProvider<Value>>) -> Self {
        Self { items }
    }
}

#[async_trait]
impl Provider<Value> for ListProvider {
    async fn resolve(&self, ctx: &AutomationData) -> ProviderResult<Value> {
        let mut items = Vec::with_capacity(self.items.len());
        for item in &self.items {
            items.push(item.resolve(ctx).await?);
        }
        Ok(Value::Array(items))
    }
}

/// Builds an object from named property providers
#[derive(Debug)]
pub struct DynamicObjectProvider {
    properties: Vec<(String, BoxProvider<Value>)>,
}

impl DynamicObjectProvider {
    /// Fails if any property name is not a valid identifier
    pub fn new(properties: Vec<(String, BoxProvider<Value>)>) -> ProviderResult<Self> {
        if let Some((name, _)) = properties
            .iter()
            .find(|(name, _)| !is_valid_property_name(name))
        {
            return Err(ProviderError::InvalidPropertyName { name: name.clone() });
        }
        Ok(Self { properties })
    }
}

#[async_trait]
impl Provider<Value> for DynamicObjectProvider {
    async fn resolve(&self, ctx: &AutomationData) -> ProviderResult<Value> {
        let mut object = IndexMap::with_capacity(self.properties.len());
        for (name, provider) in &self.properties {
            object.insert(name.clone(), provider.resolve(ctx).await?);
        }
        Ok(Value::Object(object))
    }
}

/// Builds a file value from a name and binary or text content
#[derive(Debug)]
pub struct FileProvider {
    file_name: BoxProvider<String>,
    content: BoxProvider<Value>,
}

impl FileProvider {
    pub fn new(file_name: BoxProvider<String>, content: BoxProvider<Value>) -> Self {
        Self { file_name, content }
    }
}

#[async_trait]
impl Provider<Value> for FileProvider {
    async fn resolve(&self, ctx: &AutomationData) -> ProviderResult<Value> {
        let name = self.file_name.resolve(ctx).await?;
        let content = match self.content.resolve(ctx).await? {
            Value::Binary(bytes) => bytes,
            Value::File(file) => file.content,
            Value::String(text) => text.into_bytes(),
            other => return Err(ProviderError::type_mismatch("binary", &other)),
        };
        Ok(Value::File(FileValue::new(name, content)))
    }
}

/// Number of items in a list
#[derive(Debug)]
pub struct CountListProvider {
    list: BoxProvider<Vec<Value>>,
}

impl CountListProvider {
    pub fn new(list: BoxProvider<Vec<Value>>) -> Self {
        Self { list }
    }
}

#[async_trait]
impl Provider<i64> for CountListProvider {
    async fn resolve(&self, ctx: &AutomationData) -> ProviderResult<i64> {
        let len = self.list.resolve(ctx).await?.len();
        i64::try_from(len).map_err(|e| ProviderError::InvalidValue {
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::ObjectPathLookup;
    use crate::provider::{ProviderExt, StaticProvider, Typed};
    use ae_core::INVALID_PROPERTY_NAME_MESSAGE;
    use serde_json::json;

    fn text(value: &str) -> BoxProvider<Value> {
        StaticProvider::<Value>::new(value).boxed()
    }

    #[tokio::test]
    async fn test_list() {
        let ctx = AutomationData::new(Value::from(json!({"x": 1})));
        let list = ListProvider::new(vec![text("a"), ObjectPathLookup::new("/trigger/x").boxed()]);
        assert_eq!(
            list.resolve(&ctx).await.unwrap().to_json(),
            json!(["a", 1])
        );
    }

    #[tokio::test]
    async fn test_dynamic_object() {
        let ctx = AutomationData::new(Value::Null);
        let object = DynamicObjectProvider::new(vec![
            ("first".to_string(), text("Ada")),
            ("last".to_string(), text("Lovelace")),
        ])
        .unwrap();
        assert_eq!(
            object.resolve(&ctx).await.unwrap().to_json(),
            json!({"first": "Ada", "last": "Lovelace"})
        );
    }

    #[test]
    fn test_dynamic_object_rejects_invalid_names() {
        for name in ["$id", "Name", "first-name"] {
            let err = DynamicObjectProvider::new(vec![(name.to_string(), text("x"))]).unwrap_err();
            assert_eq!(err.to_string(), INVALID_PROPERTY_NAME_MESSAGE);
        }
    }

    #[tokio::test]
    async fn test_file_from_text() {
        let ctx = AutomationData::new(Value::Null);
        let file = FileProvider::new(
            StaticProvider::<String>::new("notes.txt").boxed(),
            text("hello"),
        );
        assert_eq!(
            file.resolve(&ctx).await.unwrap(),
            Value::File(FileValue::new("notes.txt", b"hello".to_vec()))
        );
    }

    #[tokio::test]
    async fn test_count_list() {
        let ctx = AutomationData::new(Value::from(json!({"items": [1, 2, 3]})));
        let count = CountListProvider::new(
            Typed::<Vec<Value>>::new(ObjectPathLookup::new("/trigger/items").boxed()).boxed(),
        );
        assert_eq!(count.resolve(&ctx).await.unwrap(), 3);
    }
}
