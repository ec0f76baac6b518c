//! URL routing and the `/api/state` document.

use serde::Serialize;
use tiny_http::Method;
use voxmap_tiles::{StatsSnapshot, TileService, View};
use voxmap_world::{EntityPosition, WorldProvider};

/// A parsed request target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Health,
    State,
    Tile {
        world: String,
        view: View,
        tile_x: u32,
        tile_z: u32,
    },
    /// Malformed tile request; the message is sent as the response body.
    BadRequest(&'static str),
    NotFound,
}

/// Maps a method and raw URL (query string allowed) to a [`Route`].
pub fn parse_route(method: &Method, url: &str) -> Route {
    if *method != Method::Get {
        return Route::NotFound;
    }
    let path = url.split(['?', '#']).next().unwrap_or_default();
    match path {
        "/health" => Route::Health,
        "/api/state" => Route::State,
        _ if has_prefix_ignore_case(path, "/tiles/") => parse_tile_path(path),
        _ => Route::NotFound,
    }
}

fn has_prefix_ignore_case(path: &str, prefix: &str) -> bool {
    path.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// `/tiles/{world}/{view}/{tx}/{tz}.png`
fn parse_tile_path(path: &str) -> Route {
    let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();
    let [_, world, view, tx, tz] = parts.as_slice() else {
        return Route::BadRequest("Bad tile path");
    };
    let tz = tz.strip_suffix(".png").unwrap_or(tz);
    let (Ok(tile_x), Ok(tile_z)) = (tx.parse::<u32>(), tz.parse::<u32>()) else {
        return Route::BadRequest("Bad tile coordinates");
    };
    let Ok(view) = view.parse::<View>() else {
        return Route::BadRequest("Bad view");
    };
    Route::Tile {
        world: (*world).to_string(),
        view,
        tile_x,
        tile_z,
    }
}

/// One entry of the `worlds` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldSummary {
    pub name: String,
    pub loaded: bool,
    /// `"WxHxL"`, or `"unloaded"`.
    pub size: String,
    pub tiles_x: u32,
    pub tiles_z: u32,
}

/// Body of `GET /api/state`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StateResponse {
    pub worlds: Vec<WorldSummary>,
    pub tile_size: u32,
    pub players: Vec<EntityPosition>,
    pub stats: StatsSnapshot,
}

/// Collects every known world, the online players, and render counters.
pub fn build_state(provider: &dyn WorldProvider, service: &TileService) -> StateResponse {
    let tile_size = service.tile_size();
    let worlds = provider
        .world_names()
        .into_iter()
        .map(|name| match provider.loaded_world(&name) {
            Some(grid) => {
                let dims = grid.dimensions();
                WorldSummary {
                    size: format!("{}x{}x{}", dims.width, dims.height, dims.length),
                    loaded: true,
                    tiles_x: dims.width.div_ceil(tile_size),
                    tiles_z: dims.length.div_ceil(tile_size),
                    name,
                }
            }
            None => WorldSummary {
                name,
                loaded: false,
                size: "unloaded".to_string(),
                tiles_x: 0,
                tiles_z: 0,
            },
        })
        .collect();

    StateResponse {
        worlds,
        tile_size,
        players: provider.entities(),
        stats: service.stats(),
    }
}
