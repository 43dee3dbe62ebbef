use std::collections::BTreeMap;

use kvtree::{Backend, BinaryTree, KvError, OrderedMap, RedBlackTree, Result};
use rand::{seq::SliceRandom, thread_rng, Rng};

fn trees() -> Vec<(&'static str, Box<dyn OrderedMap>)> {
    vec![
        ("binary", Backend::Binary.build()),
        ("redblack", Backend::RedBlack.build()),
    ]
}

fn put(tree: &mut dyn OrderedMap, key: &str, value: &str) -> Result<()> {
    tree.put(key.as_bytes().to_vec(), value.as_bytes().to_vec())
}

fn entries(tree: &dyn OrderedMap) -> Vec<(String, String)> {
    tree.iter()
        .map(|(k, v)| {
            (
                String::from_utf8(k.to_vec()).unwrap(),
                String::from_utf8(v.to_vec()).unwrap(),
            )
        })
        .collect()
}

fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn unbalanced_scenario() -> Result<()> {
    let mut tree = BinaryTree::new();
    put(&mut tree, "a", "1")?;
    put(&mut tree, "b", "2")?;
    put(&mut tree, "c", "3")?;

    assert_eq!(entries(&tree), pairs(&[("a", "1"), ("b", "2"), ("c", "3")]));
    assert_eq!(tree.get(b"b")?, b"2");
    assert!(matches!(tree.get(b"z"), Err(KvError::KeyNotFound)));
    Ok(())
}

#[test]
fn balanced_scenario() -> Result<()> {
    let mut tree = RedBlackTree::new();
    for key in &["c", "a", "b", "d"] {
        put(&mut tree, key, "_")?;
    }

    let keys: Vec<String> = entries(&tree).into_iter().map(|(k, _)| k).collect();
    assert_eq!(keys, ["a", "b", "c", "d"]);
    tree.validate()?;
    Ok(())
}

#[test]
fn second_put_replaces_value() -> Result<()> {
    for (name, mut tree) in trees() {
        put(tree.as_mut(), "k", "v1")?;
        put(tree.as_mut(), "k", "v2")?;

        assert_eq!(tree.get(b"k")?, b"v2", "{}", name);
        assert_eq!(entries(tree.as_ref()), pairs(&[("k", "v2")]), "{}", name);
        assert_eq!(tree.len(), 1);
    }
    Ok(())
}

#[test]
fn absent_and_deleted_keys() -> Result<()> {
    for (name, mut tree) in trees() {
        assert!(matches!(tree.get(b"never"), Err(KvError::KeyNotFound)), "{}", name);
        assert!(matches!(tree.delete(b"never"), Err(KvError::KeyNotFound)), "{}", name);

        put(tree.as_mut(), "gone", "x")?;
        tree.delete(b"gone")?;
        assert!(matches!(tree.get(b"gone"), Err(KvError::KeyNotFound)), "{}", name);
        assert!(matches!(tree.delete(b"gone"), Err(KvError::KeyNotFound)), "{}", name);
        assert!(tree.is_empty());
    }
    Ok(())
}

#[test]
fn keys_compare_as_raw_bytes() -> Result<()> {
    for (_, mut tree) in trees() {
        let inserted: [&[u8]; 6] = [b"b", b"", b"\xff", b"a\x00", b"a", b"B"];
        for key in inserted {
            tree.put(key.to_vec(), key.to_vec())?;
        }
        let keys: Vec<Vec<u8>> = tree.iter().map(|(k, _)| k.to_vec()).collect();
        assert_eq!(
            keys,
            vec![
                b"".to_vec(),
                b"B".to_vec(),
                b"a".to_vec(),
                b"a\x00".to_vec(),
                b"b".to_vec(),
                b"\xff".to_vec()
            ]
        );
        assert_eq!(tree.get(b"")?, b"");
    }
    Ok(())
}

#[test]
fn walk_restarts_and_feeds_the_sink() -> Result<()> {
    for (_, mut tree) in trees() {
        for key in &["m", "c", "x", "a"] {
            put(tree.as_mut(), key, key)?;
        }

        let mut seen = Vec::new();
        tree.walk(&mut |k: &[u8], _: &[u8]| seen.push(k.to_vec()));
        assert_eq!(seen, vec![b"a".to_vec(), b"c".to_vec(), b"m".to_vec(), b"x".to_vec()]);

        // a half-consumed walk does not affect the next one
        let mut first = tree.iter();
        first.next();
        assert_eq!(tree.iter().count(), 4);
        assert_eq!(first.count(), 3);
    }
    Ok(())
}

// Random puts and deletes, checked against BTreeMap after every step.
#[test]
fn random_operations_match_btreemap() -> Result<()> {
    let mut rng = thread_rng();

    for (name, mut tree) in trees() {
        let mut model = BTreeMap::new();
        for step in 0..3000 {
            let key = format!("{:03}", rng.gen_range(0, 300)).into_bytes();
            if rng.gen_range(0, 3) == 0 {
                let expected = model.remove(&key);
                match tree.delete(&key) {
                    Ok(()) => assert!(expected.is_some(), "{} step {}", name, step),
                    Err(KvError::KeyNotFound) => assert!(expected.is_none()),
                    Err(e) => return Err(e),
                }
            } else {
                let value = step.to_string().into_bytes();
                model.insert(key.clone(), value.clone());
                tree.put(key, value)?;
            }
            tree.validate()?;
        }

        assert_eq!(tree.len(), model.len());
        let got: Vec<(Vec<u8>, Vec<u8>)> =
            tree.iter().map(|(k, v)| (k.to_vec(), v.to_vec())).collect();
        let want: Vec<(Vec<u8>, Vec<u8>)> = model.into_iter().collect();
        assert_eq!(got, want, "{}", name);
    }
    Ok(())
}

#[test]
fn red_black_height_bound_holds_for_any_order() -> Result<()> {
    let mut keys: Vec<String> = (0..2000).map(|i| format!("{:05}", i)).collect();
    let mut orders = vec![keys.clone()];
    keys.reverse();
    orders.push(keys.clone());
    keys.shuffle(&mut thread_rng());
    orders.push(keys);

    for order in orders {
        let mut tree = RedBlackTree::new();
        for (n, key) in order.iter().enumerate() {
            put(&mut tree, key, "")?;
            let bound = 2.0 * ((n + 2) as f64).log2();
            assert!(tree.height() as f64 <= bound, "height {} after {} puts", tree.height(), n + 1);
        }
        tree.validate()?;
    }
    Ok(())
}

#[test]
fn sorted_input_separates_the_strategies() -> Result<()> {
    let mut binary = Backend::Binary.build();
    let mut redblack = Backend::RedBlack.build();
    for i in 0..500 {
        let key = format!("{:04}", i);
        put(binary.as_mut(), &key, "")?;
        put(redblack.as_mut(), &key, "")?;
    }

    assert_eq!(binary.height(), 500);
    assert!(redblack.height() <= 18);
    assert_eq!(entries(binary.as_ref()), entries(redblack.as_ref()));
    Ok(())
}
