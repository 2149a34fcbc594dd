use campus_ledger::Kind;
use campus_test_utils::{class_record, setup_test_ledger};
use proptest::prelude::*;
use std::collections::HashSet;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_codes_stay_unique(codes in prop::collection::vec("[A-C][0-2]", 1..24)) {
        runtime().block_on(async {
            let (ledger, _, _) = setup_test_ledger();
            let mut seen = HashSet::new();

            for code in &codes {
                let added = ledger.join(Kind::Class, class_record(code)).await;
                let fresh = seen.insert(code.clone());
                prop_assert_eq!(added, fresh);
            }

            let listed = ledger.list(Kind::Class).await;
            let unique: HashSet<_> = listed.iter().map(|r| r.code.clone()).collect();
            prop_assert_eq!(listed.len(), unique.len());
            prop_assert_eq!(unique, seen);
            Ok(())
        })?;
    }

    #[test]
    fn prop_list_is_reverse_join_order(n in 1usize..16) {
        runtime().block_on(async {
            let (ledger, _, _) = setup_test_ledger();
            let codes: Vec<String> = (0..n).map(|i| format!("C{i}")).collect();

            for code in &codes {
                prop_assert!(ledger.join(Kind::Class, class_record(code)).await);
            }

            let listed: Vec<String> = ledger.list(Kind::Class).await.into_iter().map(|r| r.code).collect();
            let expected: Vec<String> = codes.iter().rev().cloned().collect();
            prop_assert_eq!(listed, expected);
            Ok(())
        })?;
    }

    #[test]
    fn prop_leave_removes_only_target(n in 1usize..12, target in 0usize..12) {
        runtime().block_on(async {
            let (ledger, _, _) = setup_test_ledger();
            for i in 0..n {
                ledger.join(Kind::Quiz, class_record(&format!("Q{i}"))).await;
            }

            let target_code = format!("Q{target}");
            let left = ledger.leave(Kind::Quiz, &target_code).await;
            prop_assert!(left);
            let listed = ledger.list(Kind::Quiz).await;
            let expected_len = if target < n { n - 1 } else { n };
            prop_assert_eq!(listed.len(), expected_len);
            prop_assert!(listed.iter().all(|r| r.code != target_code));
            Ok(())
        })?;
    }
}
