//! Scene asset loading: model first, then the point list.

use crate::error::LoadError;
use crate::point::PointRecord;
use crate::port::{AssetSource, LoadedModel};

/// Where the scene assets live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneLocators {
    pub model_url: String,
    pub points_url: String,
}

/// Everything needed to open or replace a scene.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedScene {
    pub model: LoadedModel,
    pub records: Vec<PointRecord>,
}

pub fn parse_point_list(text: &str) -> Result<Vec<PointRecord>, LoadError> {
    Ok(serde_json::from_str(text)?)
}

/// Load the model, then the point list. Point placement depends on the
/// model center, so the order is fixed. Any failure is fatal.
pub async fn load_scene<S: AssetSource>(
    source: &S,
    locators: &SceneLocators,
) -> Result<LoadedScene, LoadError> {
    log::info!("Loading model: {}", locators.model_url);
    let model = source.load_model(&locators.model_url).await?;
    if !model.bounds.is_valid() {
        return Err(LoadError::Model {
            locator: locators.model_url.clone(),
            reason: format!("invalid bounding box {:?}", model.bounds),
        });
    }

    log::info!("Loading points: {}", locators.points_url);
    let text = source.fetch_points(&locators.points_url).await?;
    let records = parse_point_list(&text)?;

    Ok(LoadedScene { model, records })
}
