use std::collections::VecDeque;

use libex10::fifo::{LinkedList, NodeId};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    PushFront,
    PushBack,
    PopFront,
    PopBack,
    /// Remove the live element at this position among the handles.
    Remove(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::PushFront),
        Just(Op::PushBack),
        Just(Op::PopFront),
        Just(Op::PopBack),
        any::<usize>().prop_map(Op::Remove),
    ]
}

proptest! {
    #[test]
    fn behaves_like_vec_deque(ops in prop::collection::vec(op(), 0..200)) {
        let mut list = LinkedList::new();
        let mut model = VecDeque::new();
        let mut handles: Vec<(NodeId, u32)> = Vec::new();
        let mut next = 0u32;

        for op in ops {
            match op {
                Op::PushFront => {
                    handles.push((list.push_front(next), next));
                    model.push_front(next);
                    next += 1;
                }
                Op::PushBack => {
                    handles.push((list.push_back(next), next));
                    model.push_back(next);
                    next += 1;
                }
                Op::PopFront => {
                    let popped = list.pop_front();
                    prop_assert_eq!(popped, model.pop_front());
                    handles.retain(|(_, v)| Some(*v) != popped);
                }
                Op::PopBack => {
                    let popped = list.pop_back();
                    prop_assert_eq!(popped, model.pop_back());
                    handles.retain(|(_, v)| Some(*v) != popped);
                }
                Op::Remove(pick) => {
                    if handles.is_empty() {
                        continue;
                    }
                    let (id, value) = handles.swap_remove(pick % handles.len());
                    prop_assert_eq!(list.remove(id), Some(value));
                    let at = model.iter().position(|v| *v == value).unwrap();
                    model.remove(at);
                }
            }

            prop_assert_eq!(list.count(), model.len());
            prop_assert_eq!(list.is_empty(), model.is_empty());
            prop_assert_eq!(list.front(), model.front());
            prop_assert_eq!(list.back(), model.back());
        }

        let walked: Vec<u32> = list.iter().copied().collect();
        prop_assert_eq!(walked, Vec::from(model));
        for (id, value) in &handles {
            prop_assert_eq!(list.get(*id), Some(value));
        }
    }
}
