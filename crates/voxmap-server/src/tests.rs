//! End-to-end tests over a real socket.

use crate::TileServer;
use std::io::Read;
use std::sync::Arc;
use voxmap_tiles::{DirtyTracker, TileService, TileStore};
use voxmap_world::{
    BlockColorTable, BlockId, Dimensions, EntityPosition, MemoryWorld, WorldProvider,
    WorldRegistry,
};

struct Harness {
    _dir: tempfile::TempDir,
    registry: Arc<WorldRegistry>,
    server: TileServer,
}

impl Harness {
    fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.server.actual_port(), path)
    }
}

fn start() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let registry = Arc::new(WorldRegistry::new());

    let mut colors = BlockColorTable::new();
    colors.set(BlockId::GRASS, 0x00FF00);
    let world = MemoryWorld::new("Main", Dimensions::new(100, 32, 40))
        .unwrap()
        .with_colors(colors);
    world.fill_layer(0, BlockId::STONE).unwrap();
    world.fill_column(5, 5, 10, BlockId::GRASS).unwrap();
    registry.insert(world);
    registry.insert(MemoryWorld::new("archive", Dimensions::new(16, 16, 16)).unwrap());
    registry.set_loaded("archive", false);
    registry.upsert_entity(EntityPosition {
        name: "alice".into(),
        world: "Main".into(),
        x: 5,
        y: 11,
        z: 5,
    });

    let provider: Arc<dyn WorldProvider> = registry.clone();
    let service = Arc::new(TileService::new(
        Arc::clone(&provider),
        TileStore::new(dir.path()),
        Arc::new(DirtyTracker::new()),
        64,
    ));

    let mut server = TileServer::new("127.0.0.1:0".parse().unwrap(), 2); // port 0 = OS assigns
    server.start(service, provider).unwrap();

    Harness {
        _dir: dir,
        registry,
        server,
    }
}

fn status_of(result: Result<ureq::Response, ureq::Error>) -> u16 {
    match result {
        Ok(resp) => resp.status(),
        // ureq returns an error for 4xx/5xx status codes
        Err(ureq::Error::Status(code, _)) => code,
        Err(e) => panic!("transport error: {e}"),
    }
}

#[test]
fn test_health() {
    let mut h = start();
    let resp = ureq::get(&h.url("/health")).call().unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = serde_json::from_str(&resp.into_string().unwrap()).unwrap();
    assert_eq!(body["status"], "ok");
    h.server.stop();
}

#[test]
fn test_tile_endpoint_returns_png() {
    let mut h = start();
    let resp = ureq::get(&h.url("/tiles/main/topdown/0/0.png?_=1"))
        .call()
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.header("Content-Type").unwrap(), "image/png");
    assert_eq!(resp.header("Cache-Control").unwrap(), "no-cache");

    let mut bytes = Vec::new();
    resp.into_reader().read_to_end(&mut bytes).unwrap();
    let image = image::load_from_memory(&bytes).unwrap().to_rgb8();
    assert_eq!(image.dimensions(), (64, 40));
    assert_eq!(image.get_pixel(5, 5).0, [0, 255, 0]);
    assert_eq!(image.get_pixel(0, 0).0, [100, 100, 100]);

    // Edge tile is clipped to the world.
    let resp = ureq::get(&h.url("/tiles/MAIN/Isometric/1/0.png")).call().unwrap();
    assert_eq!(resp.status(), 200);
    h.server.stop();
}

#[test]
fn test_bad_requests_return_400() {
    let mut h = start();
    for path in [
        "/tiles/main/topdown/0.png",
        "/tiles/main/topdown/a/0.png",
        "/tiles/main/topdown/-1/0.png",
        "/tiles/main/sideways/0/0.png",
    ] {
        assert_eq!(status_of(ureq::get(&h.url(path)).call()), 400, "{path}");
    }
    h.server.stop();
}

#[test]
fn test_missing_tiles_return_404() {
    let mut h = start();
    for path in [
        "/tiles/main/topdown/5/0.png",
        "/tiles/archive/topdown/0/0.png",
        "/tiles/nowhere/isometric/0/0.png",
        "/nonexistent",
    ] {
        assert_eq!(status_of(ureq::get(&h.url(path)).call()), 404, "{path}");
    }
    h.server.stop();
}

#[test]
fn test_state_endpoint() {
    let mut h = start();
    ureq::get(&h.url("/tiles/main/topdown/0/0.png")).call().unwrap();

    let resp = ureq::get(&h.url("/api/state")).call().unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = serde_json::from_str(&resp.into_string().unwrap()).unwrap();

    assert_eq!(body["tileSize"], 64);
    let worlds = body["worlds"].as_array().unwrap();
    assert_eq!(worlds.len(), 2);
    assert_eq!(worlds[0]["name"], "archive");
    assert_eq!(worlds[0]["loaded"], false);
    assert_eq!(worlds[0]["size"], "unloaded");
    assert_eq!(worlds[0]["tilesX"], 0);
    assert_eq!(worlds[1]["name"], "Main");
    assert_eq!(worlds[1]["size"], "100x32x40");
    assert_eq!(worlds[1]["tilesX"], 2);
    assert_eq!(worlds[1]["tilesZ"], 1);

    assert_eq!(body["players"][0]["name"], "alice");
    assert_eq!(body["players"][0]["y"], 11);
    assert_eq!(body["stats"]["renders"], 1);
    h.server.stop();
}

#[test]
fn test_unloading_world_keeps_serving_cached_tiles() {
    let mut h = start();
    ureq::get(&h.url("/tiles/main/isometric/0/0.png")).call().unwrap();
    h.registry.set_loaded("main", false);

    let resp = ureq::get(&h.url("/tiles/main/isometric/0/0.png")).call().unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        status_of(ureq::get(&h.url("/tiles/main/topdown/0/0.png")).call()),
        404
    );
    h.server.stop();
}
