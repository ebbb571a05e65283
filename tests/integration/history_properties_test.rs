//! Property tests for the bounded history.

use proptest::prelude::*;
use rest_plugins::history::HistoryRecorder;
use rest_plugins::models::{HttpMethod, HttpRequest, HttpResponse};
use rest_plugins::store::MemoryStore;

#[derive(Debug, Clone)]
enum Op {
    Record { with_response: bool },
    Clear,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        8 => any::<bool>().prop_map(|with_response| Op::Record { with_response }),
        1 => Just(Op::Clear),
    ]
}

fn request(n: usize) -> HttpRequest {
    HttpRequest::new(HttpMethod::GET, &format!("https://example.com/{}", n)).unwrap()
}

proptest! {
    #[test]
    fn prop_history_is_bounded_fifo(
        limit in 1usize..8,
        ops in prop::collection::vec(op_strategy(), 0..60),
    ) {
        let mut recorder = HistoryRecorder::new(Box::new(MemoryStore::new()));
        recorder.set_limit(limit);

        // Everything recorded since the last clear.
        let mut expected: Vec<(usize, bool)> = Vec::new();

        for (n, op) in ops.into_iter().enumerate() {
            match op {
                Op::Record { with_response } => {
                    let response = with_response.then(|| HttpResponse::new(200, "OK"));
                    recorder.record(request(n), response).unwrap();
                    expected.push((n, with_response));

                    let (last_n, last_has_response) = *expected.last().unwrap();
                    prop_assert_eq!(
                        recorder.last_request().unwrap().url().path(),
                        format!("/{}", last_n)
                    );
                    prop_assert_eq!(
                        recorder.last_response().unwrap().is_some(),
                        last_has_response
                    );
                }
                Op::Clear => {
                    recorder.clear();
                    expected.clear();
                    prop_assert_eq!(recorder.count(), 0);
                }
            }

            prop_assert!(recorder.count() <= limit);

            let tail_start = expected.len().saturating_sub(limit);
            let want: Vec<String> = expected[tail_start..]
                .iter()
                .map(|(n, _)| format!("/{}", n))
                .collect();
            let got: Vec<String> = recorder
                .get_all()
                .iter()
                .map(|t| t.request.url().path().to_string())
                .collect();
            prop_assert_eq!(got, want);
        }
    }
}
