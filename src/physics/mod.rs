//! Rigid-body space on top of rapier2d.
//!
//! Owns the rapier sets and pipeline, translates between `glam` and
//! nalgebra vectors, and collects begin-of-contact events. Removal enforces
//! the teardown order: joints, then colliders, then bodies.

use crossbeam::channel::{unbounded, Receiver};
use glam::Vec2;
use rapier2d::prelude::*;

/// First contact between two colliders, at least one of which has
/// collision events enabled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactBegin {
    pub a: ColliderHandle,
    pub b: ColliderHandle,
}

impl ContactBegin {
    pub fn involves(&self, collider: ColliderHandle) -> bool {
        self.a == collider || self.b == collider
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhysicsError {
    #[error("unknown body {0:?}")]
    UnknownBody(RigidBodyHandle),

    #[error("unknown collider {0:?}")]
    UnknownCollider(ColliderHandle),

    #[error("unknown joint {0:?}")]
    UnknownJoint(ImpulseJointHandle),

    #[error("body {0:?} is still referenced by joint {1:?}")]
    BodyJoined(RigidBodyHandle, ImpulseJointHandle),

    #[error("body {0:?} still has colliders attached")]
    CollidersAttached(RigidBodyHandle),
}

/// Category/filter bitmasks as rapier interaction groups
pub fn groups(memberships: u32, filter: u32) -> InteractionGroups {
    InteractionGroups::new(
        Group::from_bits_truncate(memberships),
        Group::from_bits_truncate(filter),
    )
}

/// Position motor on both linear axes, capped at `max_force`.
///
/// Attached between a kinematic cursor and a dynamic body it drags the body
/// toward the cursor without ever exceeding the cap.
pub fn follow_joint(max_force: f32, stiffness: f32, damping: f32) -> GenericJoint {
    GenericJointBuilder::new(JointAxesMask::empty())
        .motor_model(JointAxis::X, MotorModel::ForceBased)
        .motor_model(JointAxis::Y, MotorModel::ForceBased)
        .motor_position(JointAxis::X, 0.0, stiffness, damping)
        .motor_position(JointAxis::Y, 0.0, stiffness, damping)
        .motor_max_force(JointAxis::X, max_force)
        .motor_max_force(JointAxis::Y, max_force)
        .contacts_enabled(false)
        .build()
}

pub fn to_vector(v: Vec2) -> Vector<Real> {
    vector![v.x, v.y]
}

pub fn to_vec2(v: &Vector<Real>) -> Vec2 {
    Vec2::new(v.x, v.y)
}

/// The simulation world
pub struct Space {
    gravity: Vector<Real>,
    params: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: BroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd: CCDSolver,
    events: ChannelEventCollector,
    collisions: Receiver<CollisionEvent>,
    // kept so force events have somewhere to go
    _forces: Receiver<ContactForceEvent>,
}

impl Space {
    /// Empty zero-gravity space stepped `dt` seconds at a time
    pub fn new(dt: f32) -> Self {
        let (collision_tx, collisions) = unbounded();
        let (force_tx, forces) = unbounded();
        let params = IntegrationParameters {
            dt,
            ..IntegrationParameters::default()
        };

        Self {
            gravity: vector![0.0, 0.0],
            params,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: BroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd: CCDSolver::new(),
            events: ChannelEventCollector::new(collision_tx, force_tx),
            collisions,
            _forces: forces,
        }
    }

    // ------------------------------------------------------------------
    // Bodies
    // ------------------------------------------------------------------

    pub fn add_body(&mut self, body: RigidBody) -> RigidBodyHandle {
        self.bodies.insert(body)
    }

    /// Remove a body. Joints referencing it and colliders attached to it
    /// must be removed first.
    pub fn remove_body(&mut self, handle: RigidBodyHandle) -> Result<RigidBody, PhysicsError> {
        let body = self
            .bodies
            .get(handle)
            .ok_or(PhysicsError::UnknownBody(handle))?;
        if let Some((joint, _)) = self
            .impulse_joints
            .iter()
            .find(|(_, j)| j.body1 == handle || j.body2 == handle)
        {
            return Err(PhysicsError::BodyJoined(handle, joint));
        }
        if !body.colliders().is_empty() {
            return Err(PhysicsError::CollidersAttached(handle));
        }

        self.bodies
            .remove(
                handle,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                false,
            )
            .ok_or(PhysicsError::UnknownBody(handle))
    }

    pub fn position(&self, handle: RigidBodyHandle) -> Option<Vec2> {
        self.bodies.get(handle).map(|b| to_vec2(b.translation()))
    }

    pub fn velocity(&self, handle: RigidBodyHandle) -> Option<Vec2> {
        self.bodies.get(handle).map(|b| to_vec2(b.linvel()))
    }

    /// Teleport a body and bring it to rest
    pub fn reset_body(&mut self, handle: RigidBodyHandle, position: Vec2) -> Result<(), PhysicsError> {
        self.place_body(handle, position, Vec2::ZERO)
    }

    /// Teleport a body with the given velocity
    pub fn place_body(
        &mut self,
        handle: RigidBodyHandle,
        position: Vec2,
        velocity: Vec2,
    ) -> Result<(), PhysicsError> {
        let body = self
            .bodies
            .get_mut(handle)
            .ok_or(PhysicsError::UnknownBody(handle))?;
        body.set_translation(to_vector(position), true);
        if body.is_kinematic() {
            body.set_next_kinematic_translation(to_vector(position));
        } else {
            body.set_linvel(to_vector(velocity), true);
            body.set_angvel(0.0, true);
        }
        Ok(())
    }

    #[cfg(test)]
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    // ------------------------------------------------------------------
    // Colliders
    // ------------------------------------------------------------------

    /// Attach a collider to `parent`, or fix it in the world when `None`
    pub fn add_collider(
        &mut self,
        collider: Collider,
        parent: Option<RigidBodyHandle>,
    ) -> Result<ColliderHandle, PhysicsError> {
        match parent {
            Some(parent) => {
                if !self.bodies.contains(parent) {
                    return Err(PhysicsError::UnknownBody(parent));
                }
                Ok(self
                    .colliders
                    .insert_with_parent(collider, parent, &mut self.bodies))
            }
            None => Ok(self.colliders.insert(collider)),
        }
    }

    pub fn remove_collider(&mut self, handle: ColliderHandle) -> Result<Collider, PhysicsError> {
        self.colliders
            .remove(handle, &mut self.islands, &mut self.bodies, true)
            .ok_or(PhysicsError::UnknownCollider(handle))
    }

    pub fn collision_groups(&self, handle: ColliderHandle) -> Option<InteractionGroups> {
        self.colliders.get(handle).map(|c| c.collision_groups())
    }

    pub fn set_collision_groups(
        &mut self,
        handle: ColliderHandle,
        groups: InteractionGroups,
    ) -> Result<(), PhysicsError> {
        let collider = self
            .colliders
            .get_mut(handle)
            .ok_or(PhysicsError::UnknownCollider(handle))?;
        collider.set_collision_groups(groups);
        Ok(())
    }

    #[cfg(test)]
    pub fn collider_count(&self) -> usize {
        self.colliders.len()
    }

    // ------------------------------------------------------------------
    // Joints
    // ------------------------------------------------------------------

    pub fn add_joint(
        &mut self,
        anchor: RigidBodyHandle,
        body: RigidBodyHandle,
        joint: GenericJoint,
    ) -> Result<ImpulseJointHandle, PhysicsError> {
        for handle in [anchor, body] {
            if !self.bodies.contains(handle) {
                return Err(PhysicsError::UnknownBody(handle));
            }
        }
        Ok(self.impulse_joints.insert(anchor, body, joint, true))
    }

    pub fn remove_joint(&mut self, handle: ImpulseJointHandle) -> Result<ImpulseJoint, PhysicsError> {
        self.impulse_joints
            .remove(handle, true)
            .ok_or(PhysicsError::UnknownJoint(handle))
    }

    #[cfg(test)]
    pub fn joint_count(&self) -> usize {
        self.impulse_joints.len()
    }

    // ------------------------------------------------------------------
    // Simulation
    // ------------------------------------------------------------------

    /// Advance one step and return the contacts that began during it
    pub fn step(&mut self) -> Vec<ContactBegin> {
        self.pipeline.step(
            &self.gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd,
            None,
            &(),
            &self.events,
        );

        self.collisions
            .try_iter()
            .filter_map(|event| match event {
                CollisionEvent::Started(a, b, _) => Some(ContactBegin { a, b }),
                CollisionEvent::Stopped(..) => None,
            })
            .collect()
    }
}
