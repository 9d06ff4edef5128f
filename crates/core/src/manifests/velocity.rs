//! Velocity `velocity-plugin.json`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use resource_factory_api::validate::{require, validate, validate_required};
use resource_factory_api::{FactoryResult, LoaderFactory, NullIfEmpty, Pattern};

use super::{to_node, Manifest};
use crate::project::{convention, ProjectMeta, ProjectMetaConventions};

static PLUGIN_ID: Pattern = Pattern::new(r"^[a-z][a-z0-9_-]{0,63}$");

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Dependency {
    pub id: String,
    #[serde(default)]
    pub optional: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct VelocityPluginJson {
    pub id: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub authors: Vec<String>,
    pub dependencies: Vec<Dependency>,
    pub main: Option<String>,
}

impl VelocityPluginJson {
    pub fn dependency(&mut self, id: impl Into<String>, optional: bool) -> &mut Self {
        self.dependencies.push(Dependency {
            id: id.into(),
            optional,
        });
        self
    }
}

impl ProjectMetaConventions for VelocityPluginJson {
    fn set_conventions_from_project_meta(&mut self, meta: &ProjectMeta) {
        convention(&mut self.id, Some(&meta.name));
        convention(&mut self.name, Some(&meta.name));
        convention(&mut self.version, meta.version.as_ref());
        convention(&mut self.description, meta.description.as_ref());
    }
}

#[derive(Debug, Serialize)]
struct Serializable {
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    authors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dependencies: Option<Vec<Dependency>>,
    main: String,
}

impl Manifest for VelocityPluginJson {
    const FILE_NAME: &'static str = "velocity-plugin.json";

    fn loader() -> LoaderFactory {
        LoaderFactory::json()
    }

    fn project(&self) -> FactoryResult<Value> {
        for dependency in &self.dependencies {
            validate(&dependency.id, &PLUGIN_ID, "Velocity plugin id (of dependency)")?;
        }
        to_node(&Serializable {
            id: validate_required(self.id.as_deref(), &PLUGIN_ID, "id", "Velocity plugin id")?,
            name: self.name.clone(),
            version: self.version.clone(),
            description: self.description.clone(),
            url: self.url.clone(),
            authors: self.authors.null_if_empty(),
            dependencies: self.dependencies.null_if_empty(),
            main: require(&self.main, "main")?,
        })
    }

    fn describe(&self) -> String {
        format!("VelocityPluginJson(id={})", self.id.as_deref().unwrap_or("<unset>"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_pretty_json_in_field_order() {
        let mut json = VelocityPluginJson {
            main: Some("com.example.Velocity".into()),
            ..VelocityPluginJson::default()
        };
        json.dependency("luckperms", true);
        json.set_conventions_from_project_meta(&ProjectMeta::new("my-plugin").with_version("1.0"));

        let text = VelocityPluginJson::loader()
            .render(&json.project().unwrap())
            .unwrap();
        let expected = r#"{
  "id": "my-plugin",
  "name": "my-plugin",
  "version": "1.0",
  "dependencies": [
    {
      "id": "luckperms",
      "optional": true
    }
  ],
  "main": "com.example.Velocity"
}
"#;
        assert_eq!(text, expected);
    }

    #[test]
    fn id_must_start_with_a_letter() {
        let json = VelocityPluginJson {
            id: Some("1plugin".into()),
            main: Some("a.B".into()),
            ..VelocityPluginJson::default()
        };
        let message = json.project().unwrap_err().to_string();
        assert!(message.contains("Velocity plugin id"), "{message}");
    }

    #[test]
    fn authors_are_written_when_present() {
        let json = VelocityPluginJson {
            id: Some("plugin".into()),
            main: Some("a.B".into()),
            authors: vec!["Steve".into()],
            ..VelocityPluginJson::default()
        };
        assert_eq!(json.project().unwrap()["authors"][0], "Steve");
    }

    #[test]
    fn patterns_compile() {
        PLUGIN_ID.compile().unwrap();
    }
}
