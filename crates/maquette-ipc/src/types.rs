//! Sync payload types exchanged with the external backend.
//!
//! One synchronization is two ordered calls: the joints payload followed by
//! the moulds payload. Field names and shape literals are part of the wire
//! contract.

use serde::{Deserialize, Serialize};

/// A vector on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3Payload {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl From<[f32; 3]> for Vec3Payload {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self { x, y, z }
    }
}

/// A quaternion on the wire (x, y, z, w).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuatPayload {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for QuatPayload {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            w: 1.0,
        }
    }
}

impl From<[f32; 4]> for QuatPayload {
    fn from([x, y, z, w]: [f32; 4]) -> Self {
        Self { x, y, z, w }
    }
}

/// One joint in the skeleton sync payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointPayload {
    pub id: String,
    pub local_offset: Vec3Payload,
    pub local_rotation: QuatPayload,
    pub parent_id: Option<String>,
    pub children: Vec<String>,
}

/// The three shape literals the wire contract allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouldShapeName {
    Sphere,
    Capsule,
    ProfiledCapsule,
}

/// One mould in the mould sync payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MouldPayload {
    pub id: String,
    pub shape: MouldShapeName,
    pub center: Vec3Payload,
    pub radius: f32,
    pub blend_radius: f32,
    pub parent_joint_id: String,
    pub end_point: Option<Vec3Payload>,
    pub radial_profiles: Option<Vec<Vec<f32>>>,
}

/// Request for a backend-side mesh generation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshRequest {
    pub resolution: u32,
    pub fast_mode: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_names_serialize_as_contract_literals() {
        assert_eq!(
            serde_json::to_string(&MouldShapeName::Sphere).expect("json"),
            "\"Sphere\""
        );
        assert_eq!(
            serde_json::to_string(&MouldShapeName::ProfiledCapsule).expect("json"),
            "\"ProfiledCapsule\""
        );
    }

    #[test]
    fn test_joint_payload_wire_shape() {
        let joint = JointPayload {
            id: "spine".into(),
            local_offset: [0.0, 0.15, 0.0].into(),
            local_rotation: QuatPayload::default(),
            parent_id: Some("pelvis".into()),
            children: vec!["chest".into()],
        };
        let json = serde_json::to_value(&joint).expect("json");
        assert_eq!(json["local_offset"]["y"], 0.15);
        assert_eq!(json["local_rotation"]["w"], 1.0);
        assert_eq!(json["parent_id"], "pelvis");
    }

    #[test]
    fn test_mould_payload_nulls_for_sphere() {
        let mould = MouldPayload {
            id: "head".into(),
            shape: MouldShapeName::Sphere,
            center: Vec3Payload::default(),
            radius: 0.12,
            blend_radius: 0.04,
            parent_joint_id: "head".into(),
            end_point: None,
            radial_profiles: None,
        };
        let json = serde_json::to_value(&mould).expect("json");
        assert!(json["end_point"].is_null());
        assert!(json["radial_profiles"].is_null());
    }

    #[test]
    fn test_mesh_request_round_trip() {
        let request = MeshRequest {
            resolution: 96,
            fast_mode: false,
        };
        let json = serde_json::to_string(&request).expect("json");
        let back: MeshRequest = serde_json::from_str(&json).expect("parse");
        assert_eq!(back, request);
    }
}
