use super::{interpolate, types::Animation};
use crate::{bones::BoneRegistry, scene::SceneNode};
use log::trace;
use nalgebra_glm as glm;
use smallvec::SmallVec;

/// Walks the tree depth first in pre-order, children in stored order. Each
/// node's global transform is its parent's global times the local transform
/// from `local`. Bones get `prefix * global * offset`.
///
/// An explicit stack is used instead of recursion so that deep hierarchies
/// can't overflow the call stack. Children are pushed in reverse so they are
/// popped in their stored order.
fn traverse<N, F>(
    root: &N,
    parent: &glm::Mat4,
    prefix: &glm::Mat4,
    registry: &mut BoneRegistry,
    local: F,
) -> usize
where
    N: SceneNode,
    F: Fn(&N) -> glm::Mat4,
{
    let mut bones_updated = 0;
    let mut stack: SmallVec<[(&N, glm::Mat4); 16]> = SmallVec::new();
    stack.push((root, *parent));

    while let Some((node, parent)) = stack.pop() {
        let global = parent * local(node);
        if registry.apply_global(node.name(), prefix, &global) {
            bones_updated += 1;
        }
        for child in node.children().iter().rev() {
            stack.push((child, global));
        }
    }
    bones_updated
}

/// Poses the skeleton using the stored node transforms only. Used at load
/// time to give every bone a resting transform. Returns the number of bone
/// updates made.
pub fn static_pose<N: SceneNode>(
    root: &N,
    parent: &glm::Mat4,
    registry: &mut BoneRegistry,
) -> usize {
    let count = traverse(
        root,
        parent,
        &glm::Mat4::identity(),
        registry,
        N::transform,
    );
    trace!("static pose updated {} bones", count);
    count
}

/// Poses the skeleton for `animation` at `current_time` in ticks. Nodes
/// without a channel keep their stored transform. Bone final transforms are
/// expressed in model space using `global_inverse`. Returns the number of
/// bone updates made.
pub fn animate<N: SceneNode>(
    root: &N,
    animation: &Animation,
    current_time: f32,
    global_inverse: &glm::Mat4,
    registry: &mut BoneRegistry,
) -> usize {
    let count = traverse(
        root,
        &glm::Mat4::identity(),
        global_inverse,
        registry,
        |node: &N| {
            animation.channel(node.name()).map_or_else(
                || node.transform(),
                |channel| interpolate::local_transform(channel, current_time),
            )
        },
    );
    trace!("animate at {} updated {} bones", current_time, count);
    count
}

#[cfg(test)]
mod tests {
    use crate::{
        animation::{Animation, AnimationChannel, Key},
        bones::BoneRegistry,
        scene::Node,
    };
    use ahash::{HashMap, HashMapExt};
    use nalgebra_glm as glm;

    const EPSILON: f32 = 0.0005;

    fn check(a: &glm::Mat4, b: &glm::Mat4) {
        let c = glm::equal_columns_eps(a, b, EPSILON);
        assert!(c.x && c.y && c.z && c.w);
    }

    fn empty_animation() -> Animation {
        Animation {
            name: "empty".to_string(),
            duration: 10.0,
            ticks_per_second: 25.0,
            channels: HashMap::new(),
        }
    }

    /// root -> child "B"
    fn chain() -> Node {
        Node::new("root", glm::translation(&glm::vec3(1.0, 0.0, 0.0)))
            .with_child(Node::new("B", glm::Mat4::identity()))
    }

    #[test]
    fn static_single_bone_identity() {
        let root = Node::new("bone", glm::Mat4::identity());
        let mut registry = BoneRegistry::new();
        let index = registry.register_bone("bone").unwrap();

        let count =
            super::static_pose(&root, &glm::Mat4::identity(), &mut registry);
        assert_eq!(count, 1);
        assert_eq!(
            registry.bone(index).unwrap().final_transform,
            glm::Mat4::identity()
        );
    }

    #[test]
    fn static_applies_offset() {
        let mut registry = BoneRegistry::new();
        let index = registry.register_bone("B").unwrap();
        let offset = glm::scaling(&glm::vec3(2.0, 2.0, 2.0));
        registry.set_offset(index, &offset).unwrap();

        super::static_pose(&chain(), &glm::Mat4::identity(), &mut registry);
        let expected = glm::translation(&glm::vec3(1.0, 0.0, 0.0)) * offset;
        check(&registry.bone(index).unwrap().final_transform, &expected);
    }

    #[test]
    fn animated_chain_without_channels() {
        let mut registry = BoneRegistry::new();
        let index = registry.register_bone("B").unwrap();
        let animation = empty_animation();

        for time in [0.0, 3.3, 9.99] {
            super::animate(
                &chain(),
                &animation,
                time,
                &glm::Mat4::identity(),
                &mut registry,
            );
            check(
                &registry.bone(index).unwrap().final_transform,
                &glm::translation(&glm::vec3(1.0, 0.0, 0.0)),
            );
        }
    }

    #[test]
    fn animated_channel_overrides_stored_transform() {
        let mut registry = BoneRegistry::new();
        let index = registry.register_bone("B").unwrap();
        let mut animation = empty_animation();
        let mut channel = AnimationChannel::new("B");
        channel.positions = vec![
            Key::new(0.0, glm::vec3(0.0, 0.0, 0.0)),
            Key::new(10.0, glm::vec3(0.0, 4.0, 0.0)),
        ];
        animation.channels.insert("B".to_string(), channel);

        super::animate(
            &chain(),
            &animation,
            5.0,
            &glm::Mat4::identity(),
            &mut registry,
        );
        check(
            &registry.bone(index).unwrap().final_transform,
            &glm::translation(&glm::vec3(1.0, 2.0, 0.0)),
        );
    }

    #[test]
    fn global_inverse_applied() {
        let mut registry = BoneRegistry::new();
        let index = registry.register_bone("B").unwrap();
        let animation = empty_animation();
        let inverse = glm::translation(&glm::vec3(-1.0, 0.0, 0.0));

        super::animate(&chain(), &animation, 1.0, &inverse, &mut registry);
        check(
            &registry.bone(index).unwrap().final_transform,
            &glm::Mat4::identity(),
        );
    }

    /// r -> [B at (1,0,0) -> B at (0,5,0), B at (2,0,0)]. Visiting depth
    /// first, pre-order, siblings in stored order, the second sibling is the
    /// last "B" seen and its transform is what the bone keeps.
    fn repeated_names() -> Node {
        Node::new("r", glm::Mat4::identity())
            .with_child(
                Node::new("B", glm::translation(&glm::vec3(1.0, 0.0, 0.0)))
                    .with_child(Node::new(
                        "B",
                        glm::translation(&glm::vec3(0.0, 5.0, 0.0)),
                    )),
            )
            .with_child(Node::new(
                "B",
                glm::translation(&glm::vec3(2.0, 0.0, 0.0)),
            ))
    }

    #[test]
    fn static_visits_in_stored_order() {
        let mut registry = BoneRegistry::new();
        let index = registry.register_bone("B").unwrap();
        let count = super::static_pose(
            &repeated_names(),
            &glm::Mat4::identity(),
            &mut registry,
        );
        assert_eq!(count, 3);
        check(
            &registry.bone(index).unwrap().final_transform,
            &glm::translation(&glm::vec3(2.0, 0.0, 0.0)),
        );
    }

    #[test]
    fn animate_visits_in_stored_order() {
        let mut registry = BoneRegistry::new();
        let index = registry.register_bone("B").unwrap();
        let count = super::animate(
            &repeated_names(),
            &empty_animation(),
            2.0,
            &glm::Mat4::identity(),
            &mut registry,
        );
        assert_eq!(count, 3);
        check(
            &registry.bone(index).unwrap().final_transform,
            &glm::translation(&glm::vec3(2.0, 0.0, 0.0)),
        );
    }

    #[test]
    fn deep_tree() {
        // Nested chain deeper than the inline stack capacity, plus siblings
        let mut node = Node::new("leaf", glm::Mat4::identity());
        for i in 0..40 {
            node = Node::new(
                &format!("n{i}"),
                glm::translation(&glm::vec3(0.0, 0.0, 1.0)),
            )
            .with_child(node)
            .with_child(Node::new(&format!("s{i}"), glm::Mat4::identity()));
        }
        let mut registry = BoneRegistry::new();
        let leaf = registry.register_bone("leaf").unwrap();
        let count =
            super::static_pose(&node, &glm::Mat4::identity(), &mut registry);
        assert_eq!(count, 1);
        check(
            &registry.bone(leaf).unwrap().final_transform,
            &glm::translation(&glm::vec3(0.0, 0.0, 40.0)),
        );
    }
}
