//! Maquette engine facade - edits in, meshes and syncs out
//!
//! [`Maquette`] owns the skeleton and mould set, the regeneration pipeline,
//! and the update scheduler. Every edit synchronously refreshes the
//! lightweight visualization data (joint poses, profile handles), may run a
//! throttled low-resolution preview pass, and restarts the debounce that
//! eventually triggers the high-resolution final pass and a coalesced sync
//! to the external backend.
//!
//! All field sampling and extraction is synchronous on the caller's task;
//! the only suspension points are at the [`transport::Transport`] boundary.

pub mod error;
pub mod payload;
pub mod pipeline;
pub mod scheduler;
pub mod transport;

pub use error::EngineError;
pub use scheduler::{RegenScheduler, SyncChannel};
pub use transport::{SyncPayload, Transport, TransportError};

use glam::{Quat, Vec3};
use maquette_config::{EngineConfig, is_allowed_resolution};
use maquette_ipc::{MeshFrame, MeshRequest, decode_mesh_frame, encode_mesh_frame};
use meshing::{MeshBuffers, MeshingError, SurfaceStrategy};
use moulding::mould::ProfileHandle;
use moulding::{BodyShape, MouldManager, build_body};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// World-space pose of one joint, refreshed synchronously on every edit.
#[derive(Debug, Clone, PartialEq)]
pub struct JointPose {
    pub id: String,
    pub position: Vec3,
    pub rotation: Quat,
}

/// Counts of completed regeneration passes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegenStats {
    pub previews: u64,
    pub finals: u64,
}

/// The engine: skeleton + moulds + pipeline + scheduling.
#[derive(Debug)]
pub struct Maquette<T: Transport> {
    config: EngineConfig,
    strategy: SurfaceStrategy,
    manager: MouldManager,
    scheduler: RegenScheduler,
    sync: SyncChannel,
    transport: T,
    joint_poses: Vec<JointPose>,
    profile_handles: Vec<ProfileHandle>,
    mesh: MeshBuffers,
    mesh_frame: Vec<u8>,
    stats: RegenStats,
}

impl<T: Transport> Maquette<T> {
    /// Create an engine over a transport. Rejects configs whose resolutions
    /// fall outside the allowed set before anything is allocated.
    pub fn new(config: EngineConfig, transport: T) -> Result<Self, EngineError> {
        for resolution in [config.preview_resolution, config.target_resolution] {
            if !is_allowed_resolution(resolution) {
                return Err(MeshingError::InvalidResolution(resolution).into());
            }
        }
        let scheduler = RegenScheduler::new(
            Duration::from_millis(config.throttle_ms),
            Duration::from_millis(config.debounce_ms),
        );
        Ok(Self {
            config,
            strategy: SurfaceStrategy::default(),
            manager: MouldManager::new(),
            scheduler,
            sync: SyncChannel::new(),
            transport,
            joint_poses: Vec::new(),
            profile_handles: Vec::new(),
            mesh: MeshBuffers::default(),
            mesh_frame: Vec::new(),
            stats: RegenStats::default(),
        })
    }

    /// Build the humanoid for `shape`, run an initial full-resolution pass,
    /// and request an immediate sync.
    pub async fn load_body(&mut self, shape: &BodyShape) -> Result<(), EngineError> {
        self.manager = build_body(shape)?;
        self.refresh_visualization()?;
        self.run_final_pass()?;
        info!(
            joints = self.manager.skeleton().joint_count(),
            moulds = self.manager.mould_count(),
            "body loaded"
        );
        self.sync_now().await
    }

    pub fn set_strategy(&mut self, strategy: SurfaceStrategy) {
        self.strategy = strategy;
    }

    /// Add `delta` to a joint's local offset.
    pub fn move_joint(&mut self, id: &str, delta: Vec3) -> Result<(), EngineError> {
        self.manager.skeleton_mut().move_joint(id, delta)?;
        self.handle_edit()
    }

    /// Replace a joint's local offset.
    pub fn set_joint_offset(&mut self, id: &str, offset: Vec3) -> Result<(), EngineError> {
        self.manager.skeleton_mut().set_local_offset(id, offset)?;
        self.handle_edit()
    }

    /// Replace a joint's local rotation.
    pub fn set_joint_rotation(&mut self, id: &str, rotation: Quat) -> Result<(), EngineError> {
        self.manager.skeleton_mut().set_local_rotation(id, rotation)?;
        self.handle_edit()
    }

    /// Apply a relative rotation delta to a joint.
    pub fn rotate_joint(&mut self, id: &str, delta: Quat) -> Result<(), EngineError> {
        self.manager.skeleton_mut().rotate_joint(id, delta)?;
        self.handle_edit()
    }

    /// Replace a mould's base radius.
    pub fn set_mould_radius(&mut self, id: &str, radius: f32) -> Result<(), EngineError> {
        self.manager.set_radius(id, radius)?;
        self.handle_edit()
    }

    /// Replace a mould's blend radius.
    pub fn set_mould_blend_radius(&mut self, id: &str, blend: f32) -> Result<(), EngineError> {
        self.manager.set_blend_radius(id, blend)?;
        self.handle_edit()
    }

    /// Write one radial-profile cell of a profiled capsule.
    pub fn set_profile_value(
        &mut self,
        id: &str,
        segment: usize,
        point: usize,
        value: f32,
    ) -> Result<(), EngineError> {
        self.manager.set_profile_value(id, segment, point, value)?;
        self.handle_edit()
    }

    /// Wait out the debounce deadline, then run the final pass and sync.
    /// Returns immediately when no edits are pending.
    pub async fn settle(&mut self) -> Result<(), EngineError> {
        let Some(deadline) = self.scheduler.deadline() else {
            return Ok(());
        };
        let now = Instant::now();
        if deadline > now {
            tokio::time::sleep(deadline - now).await;
        }
        if self.scheduler.final_due(Instant::now()) {
            self.run_final_pass()?;
            self.sync_now().await?;
        }
        Ok(())
    }

    /// Synchronize skeleton and mould state to the backend right away,
    /// bypassing the debounce. At most one request is in flight; bursts
    /// coalesce to the latest state.
    pub async fn sync_now(&mut self) -> Result<(), EngineError> {
        let payload = SyncPayload {
            joints: payload::joint_payloads(self.manager.skeleton()),
            moulds: payload::mould_payloads(&self.manager),
        };

        let mut next = self.sync.begin(payload);
        while let Some(current) = next {
            if let Err(error) = self.send_sync(&current).await {
                // Recoverable: keep the previous mesh and visualization
                // state, retry only on the next edit
                warn!(%error, "sync failed");
            }
            next = self.sync.complete();
        }
        Ok(())
    }

    /// Ask the backend to generate a mesh and install the decoded result.
    /// On failure the previously installed mesh stays in place.
    pub async fn fetch_remote_mesh(&mut self, fast_mode: bool) -> Result<(), EngineError> {
        let request = MeshRequest {
            resolution: if fast_mode {
                self.config.preview_resolution
            } else {
                self.config.target_resolution
            },
            fast_mode,
        };
        let bytes = self.transport.request_mesh(request).await?;
        let frame = decode_mesh_frame(&bytes)
            .map_err(|e| TransportError::MalformedResponse(e.to_string()))?;
        self.mesh = frame_to_buffers(frame);
        self.mesh_frame = bytes;
        Ok(())
    }

    /// The most recently generated mesh.
    pub fn mesh(&self) -> &MeshBuffers {
        &self.mesh
    }

    /// The most recent final-pass mesh in wire framing.
    pub fn mesh_frame(&self) -> &[u8] {
        &self.mesh_frame
    }

    /// World-space joint poses, current as of the last edit.
    pub fn joint_poses(&self) -> &[JointPose] {
        &self.joint_poses
    }

    /// World-space profile control points, current as of the last edit.
    pub fn profile_handles(&self) -> &[ProfileHandle] {
        &self.profile_handles
    }

    pub fn manager(&self) -> &MouldManager {
        &self.manager
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn stats(&self) -> RegenStats {
        self.stats
    }

    /// Shared post-edit path: refresh visualization synchronously, run a
    /// throttled preview, restart the debounce.
    fn handle_edit(&mut self) -> Result<(), EngineError> {
        self.refresh_visualization()?;
        if self.scheduler.note_edit(Instant::now()) {
            self.mesh = pipeline::regenerate(
                &mut self.manager,
                &self.config.bounds,
                self.config.preview_resolution,
                self.strategy,
                true,
            )?;
            self.stats.previews += 1;
            debug!(vertices = self.mesh.vertex_count(), "preview pass");
        }
        Ok(())
    }

    fn run_final_pass(&mut self) -> Result<(), EngineError> {
        let mesh = pipeline::regenerate(
            &mut self.manager,
            &self.config.bounds,
            self.config.target_resolution,
            self.strategy,
            false,
        )?;
        self.mesh_frame =
            encode_mesh_frame(mesh.vertex_floats(), &mesh.indices, mesh.normal_floats());
        self.mesh = mesh;
        self.stats.finals += 1;
        Ok(())
    }

    fn refresh_visualization(&mut self) -> Result<(), EngineError> {
        let mut poses: Vec<JointPose> = self
            .manager
            .skeleton()
            .world_transforms()
            .into_iter()
            .map(|(id, transform)| JointPose {
                id,
                position: transform.position,
                rotation: transform.rotation,
            })
            .collect();
        poses.sort_by(|a, b| a.id.cmp(&b.id));
        self.joint_poses = poses;
        self.profile_handles = self.manager.profile_handles()?;
        Ok(())
    }

    async fn send_sync(&mut self, payload: &SyncPayload) -> Result<(), TransportError> {
        self.transport.send_joints(&payload.joints).await?;
        self.transport.send_moulds(&payload.moulds).await
    }
}

/// Unpack a decoded mesh frame into engine buffers, recomputing normals
/// locally when the frame carries none.
fn frame_to_buffers(frame: MeshFrame) -> MeshBuffers {
    let vertices = frame
        .vertices
        .chunks_exact(3)
        .map(|v| Vec3::new(v[0], v[1], v[2]))
        .collect();
    let normals = frame
        .normals
        .chunks_exact(3)
        .map(|n| Vec3::new(n[0], n[1], n[2]))
        .collect();
    let mut mesh = MeshBuffers {
        vertices,
        indices: frame.indices,
        normals,
    };
    if mesh.normals.is_empty() && !mesh.is_empty() {
        mesh.compute_smooth_normals();
    }
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use maquette_ipc::{JointPayload, MouldPayload};
    use std::sync::{Arc, Mutex};

    /// Records transport calls; optionally fails every call.
    #[derive(Debug, Clone, Default)]
    struct RecordingTransport {
        calls: Arc<Mutex<Vec<String>>>,
        fail: bool,
        mesh_response: Option<Vec<u8>>,
    }

    impl RecordingTransport {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Transport for RecordingTransport {
        async fn send_joints(&mut self, joints: &[JointPayload]) -> Result<(), TransportError> {
            if self.fail {
                return Err(TransportError::Unreachable("test".into()));
            }
            self.calls.lock().unwrap().push(format!("joints:{}", joints.len()));
            Ok(())
        }

        async fn send_moulds(&mut self, moulds: &[MouldPayload]) -> Result<(), TransportError> {
            if self.fail {
                return Err(TransportError::Unreachable("test".into()));
            }
            self.calls.lock().unwrap().push(format!("moulds:{}", moulds.len()));
            Ok(())
        }

        async fn request_mesh(&mut self, _request: MeshRequest) -> Result<Vec<u8>, TransportError> {
            self.mesh_response
                .clone()
                .ok_or_else(|| TransportError::Unreachable("no mesh backend".into()))
        }
    }

    fn test_config() -> EngineConfig {
        EngineConfig {
            // Small grids keep the tests quick
            target_resolution: 32,
            preview_resolution: 32,
            throttle_ms: 100,
            debounce_ms: 0,
            ..EngineConfig::default()
        }
    }

    #[tokio::test]
    async fn test_load_body_generates_mesh_and_syncs() {
        let transport = RecordingTransport::default();
        let handle = transport.clone();
        let mut engine = Maquette::new(test_config(), transport).expect("engine");

        engine.load_body(&BodyShape::default()).await.expect("load");

        assert!(!engine.mesh().is_empty());
        assert!(!engine.mesh_frame().is_empty());
        assert_eq!(engine.stats().finals, 1);
        // Two ordered calls: joints first, then moulds
        assert_eq!(handle.calls(), vec!["joints:17", "moulds:12"]);
        assert_eq!(engine.joint_poses().len(), 17);
        assert!(!engine.profile_handles().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_resolution_rejected_at_construction() {
        let config = EngineConfig {
            target_resolution: 33,
            ..test_config()
        };
        let result = Maquette::new(config, RecordingTransport::default());
        assert!(matches!(
            result,
            Err(EngineError::Meshing(MeshingError::InvalidResolution(33)))
        ));
    }

    #[tokio::test]
    async fn test_edit_burst_throttles_previews() {
        // A throttle window far wider than the test runtime makes the
        // coalescing observable without sleeping
        let config = EngineConfig {
            throttle_ms: 60_000,
            ..test_config()
        };
        let mut engine = Maquette::new(config, RecordingTransport::default()).expect("engine");
        engine.load_body(&BodyShape::default()).await.expect("load");

        // A burst of edits well inside one throttle window
        for _ in 0..5 {
            engine
                .move_joint("head", Vec3::new(0.0, 0.001, 0.0))
                .expect("edit");
        }
        assert_eq!(engine.stats().previews, 1);
    }

    #[tokio::test]
    async fn test_settle_runs_final_pass_and_syncs() {
        let transport = RecordingTransport::default();
        let handle = transport.clone();
        let mut engine = Maquette::new(test_config(), transport).expect("engine");
        engine.load_body(&BodyShape::default()).await.expect("load");

        engine
            .move_joint("head", Vec3::new(0.0, 0.05, 0.0))
            .expect("edit");
        engine.settle().await.expect("settle");

        assert_eq!(engine.stats().finals, 2);
        // Initial sync plus the post-settle sync, each two ordered calls
        assert_eq!(handle.calls().len(), 4);

        // Nothing pending anymore; settle is a no-op
        engine.settle().await.expect("idle settle");
        assert_eq!(engine.stats().finals, 2);
    }

    #[tokio::test]
    async fn test_transport_failure_keeps_state() {
        let transport = RecordingTransport {
            fail: true,
            ..RecordingTransport::default()
        };
        let mut engine = Maquette::new(test_config(), transport).expect("engine");

        // Load succeeds locally even though every sync fails
        engine.load_body(&BodyShape::default()).await.expect("load");
        let vertex_count = engine.mesh().vertex_count();
        assert!(vertex_count > 0);

        engine
            .move_joint("head", Vec3::new(0.0, 0.05, 0.0))
            .expect("edit");
        engine.settle().await.expect("settle");
        assert!(engine.mesh().vertex_count() > 0);
    }

    #[tokio::test]
    async fn test_unknown_joint_edit_fails_loudly() {
        let mut engine =
            Maquette::new(test_config(), RecordingTransport::default()).expect("engine");
        engine.load_body(&BodyShape::default()).await.expect("load");

        let result = engine.move_joint("tail", Vec3::ONE);
        assert!(matches!(
            result,
            Err(EngineError::Moulding(moulding::MouldingError::UnknownJoint(_)))
        ));
    }

    #[tokio::test]
    async fn test_fetch_remote_mesh_decodes_frame() {
        let vertices = [0.0f32, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let indices = [0u32, 1, 2];
        let transport = RecordingTransport {
            mesh_response: Some(encode_mesh_frame(&vertices, &indices, &[])),
            ..RecordingTransport::default()
        };
        let mut engine = Maquette::new(test_config(), transport).expect("engine");

        engine.fetch_remote_mesh(false).await.expect("fetch");
        assert_eq!(engine.mesh().vertex_count(), 3);
        assert_eq!(engine.mesh().triangle_count(), 1);
        // Empty normal section means "recompute locally"
        assert_eq!(engine.mesh().normals.len(), 3);
    }

    #[tokio::test]
    async fn test_fetch_remote_mesh_failure_keeps_previous_mesh() {
        let transport = RecordingTransport::default();
        let mut engine = Maquette::new(test_config(), transport).expect("engine");
        engine.load_body(&BodyShape::default()).await.expect("load");
        let before = engine.mesh().vertex_count();

        let result = engine.fetch_remote_mesh(false).await;
        assert!(matches!(result, Err(EngineError::Transport(_))));
        assert_eq!(engine.mesh().vertex_count(), before);
    }
}
