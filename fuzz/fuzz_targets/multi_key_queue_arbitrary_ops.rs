#![no_main]

use std::collections::HashSet;

use libfuzzer_sys::fuzz_target;
use memokit::ds::{Bucket, MultiKeyQueue, SingleKeyQueue, SlotId};

// Fuzz arbitrary operation sequences on MultiKeyQueue with multi-key buckets
//
// The key index must agree with the buckets after every operation, whether
// the operation succeeded or was rejected.
fuzz_target!(|data: &[u8]| {
    let mut queue: MultiKeyQueue<u8, SingleKeyQueue<u8>> = MultiKeyQueue::new();
    let mut model: HashSet<u8> = HashSet::new();
    let mut nodes: Vec<SlotId> = Vec::new();

    for chunk in data.chunks(3) {
        if chunk.len() < 3 {
            break;
        }
        let op = chunk[0] % 8;
        let key = chunk[1] % 32;
        let picked = (!nodes.is_empty()).then(|| nodes[usize::from(chunk[2]) % nodes.len()]);

        match op {
            0 | 1 => {
                let mut bucket = SingleKeyQueue::new();
                bucket.push_back(key).unwrap();
                let pushed = if op == 0 {
                    queue.push_back(bucket)
                } else {
                    queue.push_front(bucket)
                };
                match pushed {
                    Ok(node) => {
                        assert!(model.insert(key));
                        nodes.push(node);
                    }
                    Err(_) => assert!(model.contains(&key)),
                }
            }
            2 => {
                if let Some(node) = picked {
                    if queue.add_key_back(key, node).is_ok() {
                        assert!(model.insert(key));
                        assert_eq!(queue.node_of(&key), Some(node));
                    }
                }
            }
            3 => {
                assert_eq!(queue.drop_key(&key).unwrap(), model.remove(&key));
            }
            4 => {
                if let Some(key) = queue.take_key_front().unwrap() {
                    assert!(model.remove(&key));
                } else {
                    assert!(model.is_empty());
                }
            }
            5 => {
                if let Some(node) = picked {
                    if let Some(bucket) = queue.remove_bucket(node) {
                        for key in bucket.keys() {
                            assert!(model.remove(key));
                        }
                        assert!(!queue.contains_node(node));
                    }
                }
            }
            6 => {
                if let Some(node) = picked {
                    assert_eq!(queue.move_to_front(node), queue.contains_node(node));
                }
            }
            _ => {
                if let Some(bucket) = queue.drop_bucket(&key).unwrap() {
                    for key in bucket.keys() {
                        assert!(model.remove(key));
                    }
                } else {
                    assert!(!model.contains(&key));
                }
            }
        }

        assert_eq!(queue.len(), model.len());
        assert_eq!(queue.keys().count(), model.len());
        assert!(model.iter().all(|key| queue.contains(key)));
        queue.debug_validate_invariants();
    }
});
