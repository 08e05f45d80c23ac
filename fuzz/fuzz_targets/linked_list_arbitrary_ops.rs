#![no_main]

use std::collections::VecDeque;

use libfuzzer_sys::fuzz_target;
use memokit::ds::{LinkedList, SlotId};

// Fuzz arbitrary operation sequences on LinkedList
//
// Every operation is mirrored on a VecDeque; values are unique so positions
// can be recovered from them.
fuzz_target!(|data: &[u8]| {
    let mut list: LinkedList<u32> = LinkedList::new();
    let mut model: VecDeque<u32> = VecDeque::new();
    let mut ids: Vec<SlotId> = Vec::new();
    let mut next = 0u32;

    for chunk in data.chunks(2) {
        let op = chunk[0] % 8;
        let arg = usize::from(chunk.get(1).copied().unwrap_or(0));
        let picked = (!ids.is_empty()).then(|| ids[arg % ids.len()]);

        match op {
            0 => {
                ids.push(list.push_back(next));
                model.push_back(next);
                next += 1;
            }
            1 => {
                ids.push(list.push_front(next));
                model.push_front(next);
                next += 1;
            }
            2 => assert_eq!(list.pop_front(), model.pop_front()),
            3 => assert_eq!(list.pop_back(), model.pop_back()),
            4 => {
                if let Some(id) = picked {
                    if let Some(value) = list.remove(id) {
                        let pos = model.iter().position(|v| *v == value).unwrap();
                        model.remove(pos);
                        assert!(!list.contains(id));
                    }
                }
            }
            5 | 6 => {
                if let Some(id) = picked {
                    let value = list.get(id).copied();
                    let moved = if op == 5 {
                        list.move_to_front(id)
                    } else {
                        list.move_to_back(id)
                    };
                    assert_eq!(moved, value.is_some());
                    if let Some(value) = value {
                        let pos = model.iter().position(|v| *v == value).unwrap();
                        model.remove(pos);
                        if op == 5 {
                            model.push_front(value);
                        } else {
                            model.push_back(value);
                        }
                    }
                }
            }
            _ => {
                if let Some(anchor) = picked {
                    if let Some(value) = list.get(anchor).copied() {
                        let id = list.insert_after(anchor, next).unwrap();
                        ids.push(id);
                        let pos = model.iter().position(|v| *v == value).unwrap();
                        model.insert(pos + 1, next);
                        next += 1;
                    } else {
                        assert!(list.insert_after(anchor, next).is_none());
                    }
                }
            }
        }

        assert_eq!(list.len(), model.len());
        assert!(list.iter().eq(model.iter()));
        assert!(list.iter_rev().eq(model.iter().rev()));
        list.debug_validate_invariants();
    }
});
