//! Path: native/game_core/src/error.rs
//! Summary: シミュレーション共通のエラー型（起動時の致命的エラーと実行時フォールバックの区別）

use thiserror::Error;

/// シミュレーションのエラー。
///
/// 実行中に発生しうるもの（`UnknownArchetype` / `ResourceMissing`）は呼び出し側で
/// デフォルト値やプリミティブ描画に置き換える。起動前に返るもの
/// （`EmptyArchetypeTable` / `ConfigParse` / `Io`）だけが致命的。
#[derive(Debug, Error)]
pub enum SimError {
    #[error("archetype table has no {0} entries")]
    EmptyArchetypeTable(&'static str),

    #[error("unknown enemy archetype id {id}")]
    UnknownArchetype { id: u16 },

    #[error("unknown boss id {id}")]
    UnknownBoss { id: u16 },

    #[error("boss {id} has already spawned this run")]
    BossAlreadySpawned { id: u16 },

    #[error("archetype {id} is invalid: {reason}")]
    InvalidArchetype { id: u16, reason: &'static str },

    #[error("resource '{name}' is missing")]
    ResourceMissing { name: String },

    #[error("failed to parse {what}: {source}")]
    ConfigParse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("world lock poisoned ({context})")]
    LockPoisoned { context: &'static str },

    #[error("i/o error while reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type SimResult<T> = Result<T, SimError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_missing_id() {
        let e = SimError::UnknownArchetype { id: 42 };
        assert_eq!(e.to_string(), "unknown enemy archetype id 42");
    }

    #[test]
    fn config_parse_keeps_source() {
        let source = serde_json::from_str::<u32>("not json").unwrap_err();
        let e = SimError::ConfigParse { what: "archetype table", source };
        assert!(std::error::Error::source(&e).is_some());
    }
}
