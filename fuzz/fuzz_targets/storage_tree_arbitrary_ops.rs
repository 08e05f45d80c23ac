#![no_main]

use libfuzzer_sys::fuzz_target;
use memokit::builder::TreeBuilder;
use memokit::policy::Policy;

fn encode(path: &[u8]) -> u64 {
    path.iter().fold(0, |acc, &k| acc * 256 + u64::from(k))
}

// Fuzz arbitrary lookup / remove / clear sequences on a bounded storage tree
//
// The first five bytes pick the shape and limits; every later chunk is one
// operation on a path of `depth` keys drawn from a small alphabet.
fuzz_target!(|data: &[u8]| {
    if data.len() < 5 {
        return;
    }
    let depth = 1 + usize::from(data[0] % 4);
    let total_leaves = 1 + usize::from(data[1] % 8);
    let total_storages = depth.max(2) - 1 + usize::from(data[2] % 4);
    let leaf_storages = 1 + usize::from(data[3] % 4);
    let policy = match data[4] % 3 {
        0 => Policy::Lru,
        1 => Policy::Lfu,
        _ => Policy::Fifo,
    };

    let mut root = TreeBuilder::new(depth)
        .policy(policy)
        .total_leaves_limit(total_leaves)
        .total_storages_limit(total_storages)
        .total_leaf_storages_limit(leaf_storages)
        .check_last(data[4] & 0x80 == 0)
        .build::<u8, u64>();

    for chunk in data[5..].chunks(depth + 1) {
        if chunk.len() < depth + 1 {
            break;
        }
        let op = chunk[0] % 8;
        let path: Vec<u8> = chunk[1..].iter().map(|k| k % 6).collect();

        match op {
            0..=4 => {
                let value = root.get_or_insert_with(&path, encode).unwrap();
                assert_eq!(value, encode(&path));
                assert_eq!(root.extract_path(&path), Some(&value));
            }
            5 => {
                if let Some(value) = root.remove_path(&path).unwrap() {
                    assert_eq!(value, encode(&path));
                }
                assert_eq!(root.extract_path(&path), None);
            }
            6 => {
                if let Some(value) = root.extract_path(&path) {
                    assert_eq!(*value, encode(&path));
                }
            }
            _ => {
                root.clear().unwrap();
                assert!(root.is_empty());
                assert_eq!(root.storage_count(), 1);
            }
        }

        assert!(root.len() <= total_leaves);
    }
});
