//! Hierarchical joint system with parent-relative transforms.
//!
//! Each joint defines a frame offset and rotated relative to its parent; a
//! joint's world transform is the composition of local transforms along the
//! path to the root. World transforms are recomputed from local state on
//! demand, so edits are O(1) and staleness is never observable.

use crate::error::MouldingError;
use crate::transform::JointTransform;
use glam::{Quat, Vec3};
use std::collections::HashMap;

/// A single joint: a named frame parented into the skeleton forest.
#[derive(Debug, Clone)]
pub struct Joint {
    pub id: String,
    pub local_offset: Vec3,
    pub local_rotation: Quat,
    pub parent_id: Option<String>,
    pub children: Vec<String>,
}

impl Joint {
    pub fn new(
        id: impl Into<String>,
        local_offset: Vec3,
        local_rotation: Quat,
        parent_id: Option<&str>,
    ) -> Self {
        Self {
            id: id.into(),
            local_offset,
            local_rotation,
            parent_id: parent_id.map(str::to_owned),
            children: Vec::new(),
        }
    }

    /// A root joint at `offset` with no rotation.
    pub fn root(id: impl Into<String>, offset: Vec3) -> Self {
        Self::new(id, offset, Quat::IDENTITY, None)
    }

    fn local_transform(&self) -> JointTransform {
        JointTransform::new(self.local_offset, self.local_rotation)
    }
}

/// The joint forest. Ids are unique; every non-root joint's parent exists.
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    joints: HashMap<String, Joint>,
}

impl Skeleton {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a joint and register it with its parent.
    pub fn add_joint(&mut self, joint: Joint) -> Result<(), MouldingError> {
        if self.joints.contains_key(&joint.id) {
            return Err(MouldingError::DuplicateId(joint.id));
        }
        if let Some(parent_id) = &joint.parent_id {
            if *parent_id == joint.id {
                return Err(MouldingError::Cycle(joint.id));
            }
            if !self.joints.contains_key(parent_id) {
                return Err(MouldingError::UnknownJoint(parent_id.clone()));
            }
            // Walk the ancestor chain; inserting must keep the forest acyclic.
            let mut cursor = Some(parent_id.clone());
            while let Some(id) = cursor {
                if id == joint.id {
                    return Err(MouldingError::Cycle(joint.id));
                }
                cursor = self.joints.get(&id).and_then(|j| j.parent_id.clone());
            }
        }

        if let Some(parent_id) = joint.parent_id.clone() {
            if let Some(parent) = self.joints.get_mut(&parent_id) {
                parent.children.push(joint.id.clone());
            }
        }
        self.joints.insert(joint.id.clone(), joint);
        Ok(())
    }

    pub fn joint(&self, id: &str) -> Option<&Joint> {
        self.joints.get(id)
    }

    pub fn joints(&self) -> impl Iterator<Item = &Joint> {
        self.joints.values()
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.joints.contains_key(id)
    }

    /// World transform of a joint: local transforms folded root-to-leaf.
    pub fn world_transform(&self, id: &str) -> Result<JointTransform, MouldingError> {
        let joint = self
            .joints
            .get(id)
            .ok_or_else(|| MouldingError::UnknownJoint(id.to_owned()))?;

        let local = joint.local_transform();
        match &joint.parent_id {
            Some(parent_id) => {
                let parent = self.world_transform(parent_id)?;
                Ok(parent.compose(&local))
            }
            None => Ok(local),
        }
    }

    pub fn world_position(&self, id: &str) -> Result<Vec3, MouldingError> {
        Ok(self.world_transform(id)?.position)
    }

    /// World transforms for every joint in one pass, sharing ancestor work.
    pub fn world_transforms(&self) -> HashMap<String, JointTransform> {
        let mut memo: HashMap<String, JointTransform> = HashMap::with_capacity(self.joints.len());
        for id in self.joints.keys() {
            self.memoize_world(id, &mut memo);
        }
        memo
    }

    fn memoize_world(&self, id: &str, memo: &mut HashMap<String, JointTransform>) -> JointTransform {
        if let Some(cached) = memo.get(id) {
            return *cached;
        }
        // Joints in the map always resolve; the forest invariant is enforced
        // on insertion.
        let joint = &self.joints[id];
        let local = joint.local_transform();
        let world = match &joint.parent_id {
            Some(parent_id) => self.memoize_world(parent_id, memo).compose(&local),
            None => local,
        };
        memo.insert(id.to_owned(), world);
        world
    }

    /// Replace a joint's local offset.
    pub fn set_local_offset(&mut self, id: &str, offset: Vec3) -> Result<(), MouldingError> {
        let joint = self
            .joints
            .get_mut(id)
            .ok_or_else(|| MouldingError::UnknownJoint(id.to_owned()))?;
        joint.local_offset = offset;
        Ok(())
    }

    /// Add `delta` to a joint's local offset.
    pub fn move_joint(&mut self, id: &str, delta: Vec3) -> Result<(), MouldingError> {
        let joint = self
            .joints
            .get_mut(id)
            .ok_or_else(|| MouldingError::UnknownJoint(id.to_owned()))?;
        joint.local_offset += delta;
        Ok(())
    }

    /// Replace a joint's local rotation.
    pub fn set_local_rotation(&mut self, id: &str, rotation: Quat) -> Result<(), MouldingError> {
        let joint = self
            .joints
            .get_mut(id)
            .ok_or_else(|| MouldingError::UnknownJoint(id.to_owned()))?;
        joint.local_rotation = rotation;
        Ok(())
    }

    /// Apply a relative rotation delta in parent space: `new = current * delta`.
    /// Repeated deltas accumulate in application order.
    pub fn rotate_joint(&mut self, id: &str, delta: Quat) -> Result<(), MouldingError> {
        let joint = self
            .joints
            .get_mut(id)
            .ok_or_else(|| MouldingError::UnknownJoint(id.to_owned()))?;
        joint.local_rotation *= delta;
        Ok(())
    }

    /// Map a point in a joint's local frame to world space.
    pub fn transform_point_to_world(&self, id: &str, point: Vec3) -> Result<Vec3, MouldingError> {
        Ok(self.world_transform(id)?.transform_point(point))
    }

    /// Map a world-space point into a joint's local frame.
    pub fn transform_point_to_local(&self, id: &str, point: Vec3) -> Result<Vec3, MouldingError> {
        Ok(self.world_transform(id)?.inverse_transform_point(point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::euler_to_quat;
    use std::f32::consts::FRAC_PI_2;

    fn two_joint_chain() -> Skeleton {
        let mut skeleton = Skeleton::new();
        skeleton
            .add_joint(Joint::root("a", Vec3::ZERO))
            .expect("root");
        skeleton
            .add_joint(Joint::new(
                "b",
                Vec3::new(0.0, 0.15, 0.0),
                Quat::IDENTITY,
                Some("a"),
            ))
            .expect("child");
        skeleton
    }

    #[test]
    fn test_root_world_position_is_local_offset() {
        let mut skeleton = Skeleton::new();
        skeleton
            .add_joint(Joint::root("root", Vec3::new(0.1, 0.2, 0.3)))
            .expect("root");
        let pos = skeleton.world_position("root").expect("position");
        assert!(pos.abs_diff_eq(Vec3::new(0.1, 0.2, 0.3), 1e-6));
    }

    #[test]
    fn test_child_inherits_parent_offset() {
        let skeleton = two_joint_chain();
        let pos = skeleton.world_position("b").expect("position");
        assert!(pos.abs_diff_eq(Vec3::new(0.0, 0.15, 0.0), 1e-6));
    }

    #[test]
    fn test_parent_rotation_moves_child() {
        let mut skeleton = two_joint_chain();
        skeleton
            .set_local_rotation("a", euler_to_quat(0.0, 0.0, FRAC_PI_2))
            .expect("rotate");
        let pos = skeleton.world_position("b").expect("position");
        // 90 degrees about Z carries +Y onto -X
        assert!(pos.abs_diff_eq(Vec3::new(-0.15, 0.0, 0.0), 1e-6));
    }

    #[test]
    fn test_move_then_undo_restores_offset() {
        let mut skeleton = two_joint_chain();
        let delta = Vec3::new(0.013, -0.007, 0.021);
        skeleton.move_joint("b", delta).expect("move");
        skeleton.move_joint("b", -delta).expect("undo");
        let offset = skeleton.joint("b").expect("joint").local_offset;
        assert!(offset.abs_diff_eq(Vec3::new(0.0, 0.15, 0.0), 1e-6));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut skeleton = two_joint_chain();
        let err = skeleton
            .add_joint(Joint::root("a", Vec3::ZERO))
            .expect_err("duplicate");
        assert_eq!(err, MouldingError::DuplicateId("a".into()));
    }

    #[test]
    fn test_unknown_parent_rejected() {
        let mut skeleton = Skeleton::new();
        let err = skeleton
            .add_joint(Joint::new("b", Vec3::ZERO, Quat::IDENTITY, Some("missing")))
            .expect_err("unknown parent");
        assert_eq!(err, MouldingError::UnknownJoint("missing".into()));
    }

    #[test]
    fn test_self_parent_rejected_as_cycle() {
        let mut skeleton = two_joint_chain();
        let err = skeleton
            .add_joint(Joint::new("c", Vec3::ZERO, Quat::IDENTITY, Some("c")))
            .expect_err("self parent");
        assert_eq!(err, MouldingError::Cycle("c".into()));
    }

    #[test]
    fn test_unknown_joint_queries_fail() {
        let skeleton = two_joint_chain();
        assert!(matches!(
            skeleton.world_position("nope"),
            Err(MouldingError::UnknownJoint(_))
        ));
    }

    #[test]
    fn test_relative_rotation_accumulates() {
        let mut skeleton = two_joint_chain();
        let quarter = euler_to_quat(0.0, 0.0, FRAC_PI_2);
        skeleton.rotate_joint("a", quarter).expect("first");
        skeleton.rotate_joint("a", quarter).expect("second");
        let pos = skeleton.world_position("b").expect("position");
        // Two quarter turns about Z flip +Y to -Y
        assert!(pos.abs_diff_eq(Vec3::new(0.0, -0.15, 0.0), 1e-5));
    }

    #[test]
    fn test_children_registered_on_parent() {
        let skeleton = two_joint_chain();
        assert_eq!(skeleton.joint("a").expect("joint").children, vec!["b"]);
    }
}
