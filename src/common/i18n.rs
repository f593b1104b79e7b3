// src/common/i18n.rs

use std::collections::HashMap;
use std::sync::Arc;

pub const DEFAULT_LANG: &str = "en";

// Catálogos embutidos no binário (uma chave por mensagem)
const CATALOGS: &[(&str, &str)] = &[
    ("en", include_str!("../../locales/en.json")),
    ("pt", include_str!("../../locales/pt.json")),
    ("es", include_str!("../../locales/es.json")),
];

/// Mensagens traduzidas, carregadas uma vez e compartilhadas pelo AppState.
#[derive(Clone, Debug)]
pub struct I18nStore {
    catalogs: Arc<HashMap<String, HashMap<String, String>>>,
}

impl I18nStore {
    pub fn load() -> Self {
        let mut catalogs = HashMap::new();

        for (lang, raw) in CATALOGS {
            match serde_json::from_str::<HashMap<String, String>>(raw) {
                Ok(messages) => {
                    catalogs.insert(lang.to_string(), messages);
                }
                Err(e) => tracing::error!("Catálogo '{}' inválido: {}", lang, e),
            }
        }

        Self { catalogs: Arc::new(catalogs) }
    }

    /// Busca `key` no idioma pedido, depois no padrão, e por fim devolve a própria chave.
    /// Cada `{nome}` do texto é trocado pelo argumento correspondente.
    pub fn translate(&self, lang: &str, key: &str, args: &[(&str, &str)]) -> String {
        let template = self
            .catalogs
            .get(lang)
            .and_then(|messages| messages.get(key))
            .or_else(|| self.catalogs.get(DEFAULT_LANG).and_then(|m| m.get(key)));

        let Some(template) = template else {
            return key.to_string();
        };

        args.iter().fold(template.clone(), |text, (name, value)| {
            text.replace(&format!("{{{}}}", name), value)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_catalog_parses_and_has_the_same_keys() {
        let store = I18nStore::load();
        let reference = store.catalogs.get(DEFAULT_LANG).expect("en catalog");

        for (lang, _) in CATALOGS {
            let catalog = store.catalogs.get(*lang).expect("catalog loaded");
            for key in reference.keys() {
                assert!(catalog.contains_key(key), "'{}' sem a chave '{}'", lang, key);
            }
        }
    }

    #[test]
    fn falls_back_to_english_then_to_key() {
        let store = I18nStore::load();

        assert_eq!(
            store.translate("de", "error.forbidden", &[]),
            store.translate("en", "error.forbidden", &[])
        );
        assert_eq!(store.translate("pt", "error.nao_existe", &[]), "error.nao_existe");
    }

    #[test]
    fn interpolates_arguments() {
        let store = I18nStore::load();
        let text = store.translate("pt", "error.sku_exists", &[("sku", "ABC-1")]);

        assert!(text.contains("ABC-1"));
        assert!(!text.contains("{sku}"));
    }
}
