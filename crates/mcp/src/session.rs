use serde::Serialize;
use tracing::debug;

/// Camera snapshot pushed by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraState {
    pub longitude: f64,
    pub latitude: f64,
    pub height: f64,
    /// Ground point at the center of the view.
    pub target_longitude: f64,
    pub target_latitude: f64,
}

/// Most ids the entity list keeps; the oldest are dropped past this.
pub const MAX_TRACKED_ENTITIES: usize = 4096;

/// Mutable per-server state shared by every tool call.
///
/// The camera starts unset and is only ever replaced by the host. Entity ids come from one counter
/// that starts at 1 and never goes back.
#[derive(Debug, Clone)]
pub struct Session {
    camera: Option<CameraState>,
    next_id: u64,
    scene_mode: String,
    entities: Vec<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            camera: None,
            next_id: 1,
            scene_mode: "3D".to_string(),
            entities: Vec::new(),
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn camera(&self) -> Option<&CameraState> {
        self.camera.as_ref()
    }

    pub fn set_camera(&mut self, camera: CameraState) {
        self.camera = Some(camera);
    }

    fn allocate(&mut self, prefix: &str) -> String {
        let id = format!("{prefix}-{}", self.next_id);
        self.next_id += 1;
        if self.entities.len() == MAX_TRACKED_ENTITIES {
            let dropped = self.entities.remove(0);
            debug!(%dropped, "entity list full, forgetting oldest id");
        }
        self.entities.push(id.clone());
        id
    }

    pub fn next_entity_id(&mut self) -> String {
        self.allocate("entity")
    }

    pub fn next_tileset_id(&mut self) -> String {
        self.allocate("tileset")
    }

    /// Ids issued by this server that have not been removed since, oldest first. Holds at most
    /// [`MAX_TRACKED_ENTITIES`].
    pub fn entities(&self) -> &[String] {
        &self.entities
    }

    pub fn forget_entity(&mut self, id: &str) {
        self.entities.retain(|e| e != id);
    }

    pub fn clear_entities(&mut self) {
        self.entities.clear();
    }

    pub fn scene_mode(&self) -> &str {
        &self.scene_mode
    }

    pub fn set_scene_mode(&mut self, mode: impl Into<String>) {
        self.scene_mode = mode.into();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_list_is_bounded() {
        let mut session = Session::new();
        for _ in 0..MAX_TRACKED_ENTITIES + 2 {
            session.next_entity_id();
        }
        let entities = session.entities();
        assert_eq!(entities.len(), MAX_TRACKED_ENTITIES);
        assert_eq!(entities[0], "entity-3");
        assert_eq!(
            entities.last().map(String::as_str),
            Some(format!("entity-{}", MAX_TRACKED_ENTITIES + 2).as_str())
        );
    }

    #[test]
    fn ids_share_one_counter() {
        let mut session = Session::new();
        assert_eq!(session.next_entity_id(), "entity-1");
        assert_eq!(session.next_tileset_id(), "tileset-2");
        assert_eq!(session.next_entity_id(), "entity-3");
    }

    #[test]
    fn tracks_live_entities() {
        let mut session = Session::new();
        let a = session.next_entity_id();
        session.next_entity_id();
        session.forget_entity(&a);
        assert_eq!(session.entities(), ["entity-2"]);
        session.clear_entities();
        assert!(session.entities().is_empty());
        assert_eq!(session.next_entity_id(), "entity-3");
    }

    #[test]
    fn camera_starts_unset() {
        let mut session = Session::new();
        assert!(session.camera().is_none());
        session.set_camera(CameraState {
            longitude: 1.0,
            latitude: 2.0,
            height: 3.0,
            target_longitude: 4.0,
            target_latitude: 5.0,
        });
        assert_eq!(session.camera().unwrap().target_latitude, 5.0);
    }
}
