use bevy::prelude::*;
use combat::CombatConfig;

/// Tuning file read at startup.
const CONFIG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/combat.ron");

/// Collision and rotation tuning shared by every fighter.
#[derive(Resource, Debug, Default, Deref)]
pub struct CombatSettings(pub CombatConfig);

pub(super) fn plugin(app: &mut App) {
    app.insert_resource(CombatSettings(load_config()));
}

fn load_config() -> CombatConfig {
    match CombatConfig::load(CONFIG_PATH) {
        Ok(config) => {
            info!("Loaded combat config from {CONFIG_PATH}");
            config
        }
        Err(err) => {
            warn!("Using default combat config, could not read {CONFIG_PATH}: {err}");
            CombatConfig::default()
        }
    }
}
