use {
    consistent_ring::{
        HashRing,
        KeyHasher,
        RapidHasher,
        RingBuilder,
        RingError,
        SearchIndex,
        reassignments,
    },
    std::collections::{HashMap, HashSet},
};

fn keys(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("key-{i}")).collect()
}

fn owners<'a, H: KeyHasher>(ring: &'a HashRing<H>, keys: &[String]) -> Vec<&'a str> {
    keys.iter().map(|key| ring.get(key).unwrap()).collect()
}

fn node_set<'a>(nodes: impl IntoIterator<Item = &'a str>) -> HashSet<&'a str> {
    nodes.into_iter().collect()
}

fn balanced_ring(nodes: &[&str], virtual_nodes: usize) -> HashRing<RapidHasher> {
    RingBuilder::new(nodes.iter().copied())
        .with_hasher(RapidHasher)
        .with_search_index(SearchIndex::AllPositions)
        .with_virtual_nodes(virtual_nodes)
        .build()
        .expect("Failed to create ring")
}

#[test]
fn three_node_scenario() {
    let mut ring = HashRing::new();
    ring.add("A");
    ring.add("B");
    ring.add("C");
    assert_eq!(node_set(ring.list_nodes()), node_set(["A", "B", "C"]));

    let before: HashMap<&str, String> = ["key1", "key2", "key3", "key4", "key5"]
        .into_iter()
        .map(|key| (key, ring.get(key).unwrap().to_owned()))
        .collect();
    for (key, owner) in &before {
        assert!(["A", "B", "C"].contains(&owner.as_str()));
        // Stable on repeated calls.
        assert_eq!(ring.get(key), Ok(owner.as_str()));
    }

    ring.remove("B");
    assert_eq!(node_set(ring.list_nodes()), node_set(["A", "C"]));
    for (key, owner) in &before {
        let now = ring.get(key).unwrap();
        assert!(now == "A" || now == "C");
        if owner != "B" {
            assert_eq!(now, owner);
        }
    }
}

#[test]
fn empty_ring_fails() {
    let mut ring = HashRing::new();
    assert_eq!(ring.get("anything"), Err(RingError::EmptyRing));
    assert_eq!(ring.get(""), Err(RingError::EmptyRing));

    ring.add("A");
    assert_eq!(ring.get("anything"), Ok("A"));

    ring.remove("A");
    assert_eq!(ring.get("anything"), Err(RingError::EmptyRing));
}

#[test]
fn lookups_are_deterministic() {
    let keys = keys(1000);
    let ring = RingBuilder::new(["A", "B", "C"]).build().unwrap();
    let same = RingBuilder::new(["C", "A", "B"]).build().unwrap();

    let first = owners(&ring, &keys);
    assert_eq!(first, owners(&ring, &keys));
    // Insertion order does not matter.
    assert_eq!(first, owners(&same, &keys));
}

#[test]
fn lookups_return_members() {
    let keys = keys(1000);
    for search_index in [SearchIndex::RealNodes, SearchIndex::AllPositions] {
        let mut ring = RingBuilder::new(["A", "B", "C", "D"])
            .with_search_index(search_index)
            .build()
            .unwrap();
        ring.remove("B");
        ring.remove("D");
        for owner in owners(&ring, &keys) {
            assert!(owner == "A" || owner == "C", "unexpected owner {owner}");
        }
    }
}

#[test]
fn idempotent_membership() {
    let keys = keys(1000);
    let once = RingBuilder::new(["A", "B"]).build().unwrap();
    let mut twice = once.clone();

    assert!(!twice.add("A"));
    assert_eq!(node_set(once.list_nodes()), node_set(twice.list_nodes()));
    assert_eq!(owners(&once, &keys), owners(&twice, &keys));

    assert!(!twice.remove("Z"));
    assert_eq!(node_set(once.list_nodes()), node_set(twice.list_nodes()));
    assert_eq!(owners(&once, &keys), owners(&twice, &keys));
}

#[test]
fn join_only_moves_keys_to_new_node() {
    let keys = keys(10_000);
    for search_index in [SearchIndex::RealNodes, SearchIndex::AllPositions] {
        let old = RingBuilder::new(["A", "B", "C"])
            .with_search_index(search_index)
            .build()
            .unwrap();
        let mut new = old.clone();
        new.add("D");

        for moved in reassignments(&old, &new, keys.iter().map(String::as_str)) {
            assert_eq!(moved.to, Some("D"), "key {} moved elsewhere", moved.key);
        }
    }
}

#[test]
fn join_remaps_a_bounded_fraction() {
    let keys = keys(10_000);
    let old = balanced_ring(&["A", "B", "C"], 20);
    let mut new = old.clone();
    new.add("D");

    let moved = reassignments(&old, &new, keys.iter().map(String::as_str)).len();
    assert!(moved > 0);
    assert!(
        moved < keys.len() / 2,
        "too many keys remapped: {moved} of {}",
        keys.len()
    );
}

#[test]
fn leave_only_moves_keys_of_removed_node() {
    let keys = keys(10_000);
    for search_index in [SearchIndex::RealNodes, SearchIndex::AllPositions] {
        let mut ring = RingBuilder::new(["A", "B", "C"])
            .with_search_index(search_index)
            .build()
            .unwrap();
        let before: Vec<String> = owners(&ring, &keys)
            .into_iter()
            .map(str::to_owned)
            .collect();

        ring.remove("B");
        for (owner, now) in before.iter().zip(owners(&ring, &keys)) {
            if owner == "B" {
                assert!(now == "A" || now == "C");
            } else {
                assert_eq!(owner, now);
            }
        }
    }
}

#[test]
fn rejoin_restores_assignment() {
    let keys = keys(1000);
    let mut ring = RingBuilder::new(["A", "B", "C"]).build().unwrap();
    let before: Vec<String> = owners(&ring, &keys)
        .into_iter()
        .map(str::to_owned)
        .collect();

    ring.remove("B");
    ring.add("B");
    assert_eq!(before, owners(&ring, &keys));
}

#[test]
fn virtual_nodes_balance_load() {
    let nodes = (0..5).map(|i| format!("node{i}")).collect::<Vec<_>>();
    let node_refs = nodes.iter().map(String::as_str).collect::<Vec<_>>();
    let ring = balanced_ring(&node_refs, 200);

    // Count how many keys landed on each node.
    let keys = keys(50_000);
    let mut counts = HashMap::<&str, usize>::new();
    for owner in owners(&ring, &keys) {
        *counts.entry(owner).or_insert(0) += 1;
    }
    assert_eq!(counts.len(), nodes.len());

    // Ensure that every node gets between half and one and a half times its
    // fair share.
    let fair = keys.len() / nodes.len();
    for (node, count) in counts {
        assert!(
            count > fair / 2 && count < fair * 3 / 2,
            "unbalanced node {node}: {count} keys, fair share is {fair}"
        );
    }
}

#[test]
fn intervals_cover_ring() {
    let ring = balanced_ring(&["A", "B", "C"], 20);
    let total: u64 = ring
        .nodes()
        .flat_map(|node| ring.intervals(node).unwrap())
        .map(|range| range.len())
        .sum();
    assert_eq!(total, 1 << 32);
    assert!(ring.intervals("Z").is_none());
}
