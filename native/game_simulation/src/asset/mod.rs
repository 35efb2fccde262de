//! Path: native/game_simulation/src/asset/mod.rs
//! Summary: リソース取得口（ResourceProvider）と起動時に 1 回だけ作るアセット表（AssetRegistry）
//!
//! 見つからないスプライトはアーキタイプ色の円（プリミティブ）で描き、見つからない効果音は鳴らさない。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use game_core::entity_params::ArchetypeTable;
use game_core::{SimError, SimResult};
use rustc_hash::FxHashMap;

/// 効果音 ID と名前の対応を 1 箇所に集約
macro_rules! define_sounds {
    ($($id:ident => $name:literal),* $(,)?) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum SoundId {
            $($id,)*
        }

        impl SoundId {
            pub const ALL: &'static [SoundId] = &[$(SoundId::$id,)*];

            /// `FrameEvent::PlaySound` で使う名前（= ファイル名の stem）
            pub fn name(self) -> &'static str {
                match self {
                    $(SoundId::$id => $name,)*
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(SoundId::$id),)*
                    _ => None,
                }
            }
        }
    };
}

define_sounds! {
    BossSpawn  => "boss_spawn",
    EnemyDeath => "enemy_death",
    PlayerHurt => "player_hurt",
    LevelUp    => "level_up",
}

/// スプライト・効果音・フォントの取得口。見つからなければ `SimError::ResourceMissing`。
pub trait ResourceProvider: Send + Sync {
    fn load_sprite(&self, name: &str) -> SimResult<Vec<u8>>;
    fn load_sound(&self, name: &str) -> SimResult<Vec<u8>>;
    fn get_font(&self, name: &str) -> SimResult<Vec<u8>>;
}

/// ディレクトリから読む。`sprites/{name}.png`, `audio/{name}.wav`, `fonts/{name}.ttf`
pub struct DirectoryProvider {
    base_path: PathBuf,
}

impl Default for DirectoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectoryProvider {
    /// 環境変数 `GAME_ASSETS_PATH` が設定されていればベースパスとして使用する（無ければ `assets`）
    pub fn new() -> Self {
        let base_path = std::env::var("GAME_ASSETS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("assets"));
        Self { base_path }
    }

    pub fn with_base_path<P: AsRef<Path>>(path: P) -> Self {
        Self { base_path: path.as_ref().to_path_buf() }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn read(&self, dir: &str, name: &str, ext: &str) -> SimResult<Vec<u8>> {
        let path = self.base_path.join(dir).join(format!("{name}.{ext}"));
        std::fs::read(&path).map_err(|e| {
            log::debug!("asset {} not readable: {e}", path.display());
            SimError::ResourceMissing { name: format!("{dir}/{name}.{ext}") }
        })
    }
}

impl ResourceProvider for DirectoryProvider {
    fn load_sprite(&self, name: &str) -> SimResult<Vec<u8>> {
        self.read("sprites", name, "png")
    }

    fn load_sound(&self, name: &str) -> SimResult<Vec<u8>> {
        self.read("audio", name, "wav")
    }

    fn get_font(&self, name: &str) -> SimResult<Vec<u8>> {
        self.read("fonts", name, "ttf")
    }
}

/// 何も持たない（ヘッドレス・テスト用）
#[derive(Clone, Copy, Debug, Default)]
pub struct NullProvider;

impl ResourceProvider for NullProvider {
    fn load_sprite(&self, name: &str) -> SimResult<Vec<u8>> {
        Err(SimError::ResourceMissing { name: name.to_string() })
    }

    fn load_sound(&self, name: &str) -> SimResult<Vec<u8>> {
        Err(SimError::ResourceMissing { name: name.to_string() })
    }

    fn get_font(&self, name: &str) -> SimResult<Vec<u8>> {
        Err(SimError::ResourceMissing { name: name.to_string() })
    }
}

/// 敵 1 種類分の描画方法
#[derive(Clone, Debug, PartialEq)]
pub enum SpriteRef {
    Sprite { name: Arc<str>, data: Arc<[u8]> },
    /// スプライトが無いときの円
    Primitive { color: [f32; 4], radius: f32 },
}

impl SpriteRef {
    pub fn is_primitive(&self) -> bool {
        matches!(self, SpriteRef::Primitive { .. })
    }
}

pub const DEFAULT_FONT: &str = "default";

/// 起動時に 1 回だけ読み込み、以後は参照だけ
pub struct AssetRegistry {
    sprites: FxHashMap<u16, SpriteRef>,
    sounds:  FxHashMap<SoundId, Arc<[u8]>>,
    font:    Option<Arc<[u8]>>,
}

impl AssetRegistry {
    /// 何も読み込まない（全てプリミティブ・無音）
    pub fn empty() -> Self {
        Self { sprites: FxHashMap::default(), sounds: FxHashMap::default(), font: None }
    }

    pub fn preload(provider: &dyn ResourceProvider, table: &ArchetypeTable) -> Self {
        let mut sprites = FxHashMap::default();
        let all = table.enemies.iter().chain(table.bosses.iter().map(|b| &b.stats));
        for params in all {
            let primitive = SpriteRef::Primitive { color: params.color, radius: params.radius };
            let entry = match params.sprite.as_deref() {
                None => primitive,
                Some(name) => match provider.load_sprite(name) {
                    Ok(bytes) => SpriteRef::Sprite { name: Arc::from(name), data: Arc::from(bytes) },
                    Err(e) => {
                        log::warn!("{e}; drawing archetype {} as a primitive", params.id);
                        primitive
                    }
                },
            };
            sprites.insert(params.id, entry);
        }

        let mut sounds = FxHashMap::default();
        for &id in SoundId::ALL {
            match provider.load_sound(id.name()) {
                Ok(bytes) => {
                    sounds.insert(id, Arc::from(bytes));
                }
                Err(e) => log::debug!("{e}; sound {} is silent", id.name()),
            }
        }

        let font = match provider.get_font(DEFAULT_FONT) {
            Ok(bytes) => Some(Arc::from(bytes)),
            Err(e) => {
                log::warn!("{e}; text falls back to the renderer's built-in font");
                None
            }
        };

        let missing = sprites.values().filter(|s| s.is_primitive()).count();
        log::info!(
            "assets: {} archetypes ({} primitive), {}/{} sounds, font={}",
            sprites.len(),
            missing,
            sounds.len(),
            SoundId::ALL.len(),
            font.is_some()
        );
        Self { sprites, sounds, font }
    }

    /// 表に無い ID は灰色の円
    pub fn sprite(&self, archetype_id: u16) -> SpriteRef {
        self.sprites
            .get(&archetype_id)
            .cloned()
            .unwrap_or(SpriteRef::Primitive { color: [0.8, 0.8, 0.8, 1.0], radius: 16.0 })
    }

    /// 無ければ None（鳴らさない）
    pub fn sound(&self, name: &str) -> Option<&[u8]> {
        SoundId::from_name(name)
            .and_then(|id| self.sounds.get(&id))
            .map(|b| &**b)
    }

    pub fn font(&self) -> Option<&[u8]> {
        self.font.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::entity_params::EnemyParams;

    #[test]
    fn null_provider_yields_primitives_and_silence() {
        let table = ArchetypeTable::default();
        let reg = AssetRegistry::preload(&NullProvider, &table);
        let id = table.enemies[0].id;
        assert_eq!(
            reg.sprite(id),
            SpriteRef::Primitive { color: table.enemies[0].color, radius: table.enemies[0].radius }
        );
        assert!(reg.sound("enemy_death").is_none());
        assert!(reg.font().is_none());
        assert!(reg.sprite(999).is_primitive());
    }

    #[test]
    fn directory_provider_reads_existing_files() {
        let dir = std::env::temp_dir().join(format!("sim-assets-{}", std::process::id()));
        std::fs::create_dir_all(dir.join("sprites")).unwrap();
        std::fs::create_dir_all(dir.join("audio")).unwrap();
        std::fs::write(dir.join("sprites").join("slime.png"), b"png").unwrap();
        std::fs::write(dir.join("audio").join("level_up.wav"), b"wav").unwrap();

        let mut slime = EnemyParams::fallback(1);
        slime.sprite = Some("slime".to_string());
        let mut ghost = EnemyParams::fallback(2);
        ghost.sprite = Some("ghost".to_string());
        let mut table = ArchetypeTable::default();
        table.enemies = vec![slime, ghost];

        let reg = AssetRegistry::preload(&DirectoryProvider::with_base_path(&dir), &table);
        assert!(matches!(reg.sprite(1), SpriteRef::Sprite { ref name, .. } if &**name == "slime"));
        assert!(reg.sprite(2).is_primitive());
        assert_eq!(reg.sound("level_up"), Some(&b"wav"[..]));
        assert!(reg.sound("boss_spawn").is_none());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn sound_names_roundtrip() {
        for &id in SoundId::ALL {
            assert_eq!(SoundId::from_name(id.name()), Some(id));
        }
        assert_eq!(SoundId::from_name("nope"), None);
    }
}
