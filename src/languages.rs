//! Registry of languages the session can run

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::Error;

/// Runtime name and version understood by the execution backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeDescriptor {
    #[serde(rename = "runtime")]
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageConfig {
    /// Human readable name shown in language pickers
    pub label: String,
    #[serde(flatten)]
    pub runtime: RuntimeDescriptor,
    /// Identifier the editor widget uses for highlighting
    pub monaco_language: String,
    /// Starter program for an empty editor
    #[serde(default)]
    pub default_code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageRegistry {
    #[serde(default)]
    languages: BTreeMap<String, LanguageConfig>,
}

impl LanguageRegistry {
    /// An empty registry; every language is unsupported
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load a registry from TOML, one `[languages.<id>]` table per language:
    ///
    /// ```toml
    /// [languages.python]
    /// label = "Python"
    /// runtime = "python"
    /// version = "3.10.0"
    /// monaco_language = "python"
    /// default_code = "print('hi')"
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self, Error> {
        Ok(toml::from_str(source)?)
    }

    pub fn with_language(mut self, id: impl Into<String>, config: LanguageConfig) -> Self {
        self.languages.insert(id.into(), config);
        self
    }

    pub fn get(&self, id: &str) -> Option<&LanguageConfig> {
        self.languages.get(id)
    }

    pub fn runtime(&self, id: &str) -> Option<&RuntimeDescriptor> {
        self.get(id).map(|config| &config.runtime)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.languages.contains_key(id)
    }

    /// Language identifiers in sorted order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.languages.keys().map(String::as_str)
    }

    pub fn default_code(&self, id: &str) -> Option<&str> {
        self.get(id).map(|config| config.default_code.as_str())
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}

fn entry(label: &str, runtime: &str, version: &str, monaco: &str, code: &str) -> LanguageConfig {
    LanguageConfig {
        label: label.to_string(),
        runtime: RuntimeDescriptor {
            name: runtime.to_string(),
            version: version.to_string(),
        },
        monaco_language: monaco.to_string(),
        default_code: code.to_string(),
    }
}

impl LanguageRegistry {
    /// Languages available on the public Piston instance
    pub fn builtin() -> Self {
        Self::empty()
            .with_language(
                "javascript",
                entry(
                    "JavaScript",
                    "javascript",
                    "18.15.0",
                    "javascript",
                    "console.log('Hello, World!');",
                ),
            )
            .with_language(
                "typescript",
                entry(
                    "TypeScript",
                    "typescript",
                    "5.0.3",
                    "typescript",
                    "const greeting: string = 'Hello, World!';\nconsole.log(greeting);",
                ),
            )
            .with_language(
                "python",
                entry("Python", "python", "3.10.0", "python", "print('Hello, World!')"),
            )
            .with_language(
                "java",
                entry(
                    "Java",
                    "java",
                    "15.0.2",
                    "java",
                    "public class Main {\n    public static void main(String[] args) {\n        System.out.println(\"Hello, World!\");\n    }\n}",
                ),
            )
            .with_language(
                "go",
                entry(
                    "Go",
                    "go",
                    "1.16.2",
                    "go",
                    "package main\n\nimport \"fmt\"\n\nfunc main() {\n    fmt.Println(\"Hello, World!\")\n}",
                ),
            )
            .with_language(
                "rust",
                entry(
                    "Rust",
                    "rust",
                    "1.68.2",
                    "rust",
                    "fn main() {\n    println!(\"Hello, World!\");\n}",
                ),
            )
            .with_language(
                "cpp",
                entry(
                    "C++",
                    "cpp",
                    "10.2.0",
                    "cpp",
                    "#include <iostream>\n\nint main() {\n    std::cout << \"Hello, World!\" << std::endl;\n    return 0;\n}",
                ),
            )
            .with_language(
                "csharp",
                entry(
                    "C#",
                    "csharp",
                    "6.12.0",
                    "csharp",
                    "using System;\n\nclass Program {\n    static void Main() {\n        Console.WriteLine(\"Hello, World!\");\n    }\n}",
                ),
            )
            .with_language(
                "ruby",
                entry("Ruby", "ruby", "3.0.1", "ruby", "puts 'Hello, World!'"),
            )
            .with_language(
                "swift",
                entry("Swift", "swift", "5.3.3", "swift", "print(\"Hello, World!\")"),
            )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry() {
        let registry = LanguageRegistry::builtin();
        assert_eq!(registry.len(), 10);
        assert!(registry.contains("javascript"));
        assert!(!registry.contains("cobol"));

        let python = registry.runtime("python").unwrap();
        assert_eq!(python.name, "python");
        assert_eq!(python.version, "3.10.0");

        let ids: Vec<_> = registry.ids().collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_from_toml() {
        let registry = LanguageRegistry::from_toml_str(
            r#"
            [languages.python]
            label = "Python"
            runtime = "python"
            version = "3.12.0"
            monaco_language = "python"

            [languages.lua]
            label = "Lua"
            runtime = "lua"
            version = "5.4.4"
            monaco_language = "lua"
            default_code = "print('hi')"
            "#,
        )
        .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.runtime("python").unwrap().version, "3.12.0");
        assert_eq!(registry.default_code("python"), Some(""));
        assert_eq!(registry.default_code("lua"), Some("print('hi')"));
        assert_eq!(registry.get("lua").unwrap().label, "Lua");
    }

    #[test]
    fn test_from_invalid_toml() {
        let result = LanguageRegistry::from_toml_str("[languages.python]\nlabel = 3");
        assert!(matches!(result, Err(Error::Registry(_))));
    }
}
