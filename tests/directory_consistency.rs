use cuckoo_tables::{Config, ExtendibleTable, HybridTable};
use rand::{rngs::StdRng, Rng, SeedableRng};
use test_log::test;

#[test]
fn extendible_consistent_after_random_workload() -> cuckoo_tables::Result<()> {
    let mut rng = StdRng::seed_from_u64(7);

    for bucket_size in [1, 2, 4, 16] {
        let mut table = ExtendibleTable::new(Config::default().bucket_size(bucket_size));

        for _ in 0..2_000 {
            table.insert(rng.random::<u64>())?;
            // cheap enough to check after every single operation
            debug_assert!(table.is_directory_consistent());
        }

        assert!(table.is_directory_consistent());
        assert!(table.bucket_count() <= table.size());
    }

    Ok(())
}

#[test]
fn hybrid_consistent_after_random_workload() -> cuckoo_tables::Result<()> {
    let mut rng = StdRng::seed_from_u64(8);
    let mut table = HybridTable::new(Config::default());

    for _ in 0..2_000 {
        table.insert(rng.random::<u64>())?;
    }

    assert!(table.is_directory_consistent());

    let (a, b) = table.directory_lens();
    assert_eq!(2_000, a + b, "random u64 keys should not collide");

    Ok(())
}

#[test]
fn extendible_skewed_keys_stay_consistent() -> cuckoo_tables::Result<()> {
    let mut table = ExtendibleTable::new(Config::default().bucket_size(2));

    // keys with strides force uneven directory growth
    for key in (0..4_096).step_by(64) {
        table.insert(key)?;
    }
    for key in 0..64 {
        table.insert(key)?;
    }

    assert!(table.is_directory_consistent());

    Ok(())
}
