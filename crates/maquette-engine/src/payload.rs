//! Conversions from engine state to wire payloads.

use maquette_ipc::{JointPayload, MouldPayload, MouldShapeName, QuatPayload, Vec3Payload};
use moulding::mould::MouldShape;
use moulding::{MouldManager, Skeleton};

fn vec3_payload(v: glam::Vec3) -> Vec3Payload {
    v.to_array().into()
}

/// The full joint list, sorted by id for a stable wire order.
pub fn joint_payloads(skeleton: &Skeleton) -> Vec<JointPayload> {
    let mut payloads: Vec<JointPayload> = skeleton
        .joints()
        .map(|joint| JointPayload {
            id: joint.id.clone(),
            local_offset: vec3_payload(joint.local_offset),
            local_rotation: QuatPayload::from(joint.local_rotation.to_array()),
            parent_id: joint.parent_id.clone(),
            children: joint.children.clone(),
        })
        .collect();
    payloads.sort_by(|a, b| a.id.cmp(&b.id));
    payloads
}

/// The full mould list, in the manager's insertion order.
pub fn mould_payloads(manager: &MouldManager) -> Vec<MouldPayload> {
    manager
        .moulds()
        .map(|mould| MouldPayload {
            id: mould.id.clone(),
            shape: match mould.shape {
                MouldShape::Sphere => MouldShapeName::Sphere,
                MouldShape::Capsule => MouldShapeName::Capsule,
                MouldShape::ProfiledCapsule => MouldShapeName::ProfiledCapsule,
            },
            center: vec3_payload(mould.center),
            radius: mould.radius,
            blend_radius: mould.blend_radius,
            parent_joint_id: mould.parent_joint_id.clone(),
            end_point: mould.end_point.map(vec3_payload),
            radial_profiles: mould.radial_profiles.clone(),
        })
        .collect()
}
