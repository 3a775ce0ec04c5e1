use std::sync::Arc;

use glosa_core::{Attribute, TreeStore};
use glosa_dict_pons::PonsDictionary;
use glosa_types::{AppEvent, NodeAddress};
use kanal::AsyncReceiver;

use super::{BAUM_PAGE, CannedFetcher, HAUS_PAGE, SETTINGS, app_state, completion};
use crate::controller::AppController;
use crate::worker::{Dispatcher, WorkerSettings};

fn dispatcher(
    fetcher: CannedFetcher,
    settings: WorkerSettings,
) -> (Arc<TreeStore>, Arc<Dispatcher>, Arc<CannedFetcher>, AsyncReceiver<AppEvent>) {
    let store = Arc::new(TreeStore::new("de", "en"));
    let fetcher = Arc::new(fetcher);
    let (tx, rx) = kanal::unbounded_async();
    let dispatcher = Dispatcher::new(
        store.clone(),
        Arc::new(PonsDictionary::new("https://mobile.pons.eu")),
        fetcher.clone(),
        settings,
        tx,
    );
    (store, dispatcher, fetcher, rx)
}

#[tokio::test]
async fn translates_and_simplifies() {
    let fetcher = CannedFetcher::default()
        .with_page("Haus", HAUS_PAGE)
        .with_page("Baum", BAUM_PAGE);
    let (store, dispatcher, fetcher, rx) = dispatcher(fetcher, SETTINGS);

    for addr in store.add_main_words(&["Haus", "Baum"]) {
        dispatcher.translate(addr);
    }
    completion(&rx).await;

    assert_eq!(fetcher.calls(), 2);
    assert!(!dispatcher.is_running());
    assert_eq!(
        store.outline(&NodeAddress::main_word(0)).unwrap(),
        "Haus\n  Noun\n    house\n  Häuschen\n    little house\n"
    );
    assert_eq!(store.outline(&NodeAddress::main_word(1)).unwrap(), "Baum\n  tree\n");
}

#[tokio::test]
async fn raw_tree_kept_without_simplification() {
    let settings = WorkerSettings {
        simplify: false,
        ..SETTINGS
    };
    let (store, dispatcher, _, rx) = dispatcher(CannedFetcher::default().with_page("Baum", BAUM_PAGE), settings);

    let main = store.add_main_word("Baum");
    dispatcher.translate(main.clone());
    completion(&rx).await;

    assert_eq!(store.outline(&main).unwrap(), "Baum\n  Baum\n    tree\n");
}

#[tokio::test]
async fn failed_fetch_leaves_word_untouched() {
    let (store, dispatcher, fetcher, rx) = dispatcher(CannedFetcher::default(), SETTINGS);

    let main = store.add_main_word("Unbekannt");
    dispatcher.translate(main.clone());
    completion(&rx).await;

    assert_eq!(fetcher.calls(), 1);
    assert_eq!(store.child_count(&main), Some(0));
}

#[tokio::test]
async fn unknown_address_is_dropped() {
    let (store, dispatcher, fetcher, rx) = dispatcher(CannedFetcher::default(), SETTINGS);

    dispatcher.translate(NodeAddress::main_word(3));
    completion(&rx).await;

    assert_eq!(fetcher.calls(), 0);
    assert_eq!(store.node_count(), 0);
}

#[tokio::test]
async fn worker_restarts_after_completion() {
    let fetcher = CannedFetcher::default().with_page("Baum", BAUM_PAGE);
    let (store, dispatcher, fetcher, rx) = dispatcher(fetcher, SETTINGS);

    let main = store.add_main_word("Baum");
    dispatcher.translate(main.clone());
    completion(&rx).await;

    dispatcher.translate_all();
    completion(&rx).await;

    assert_eq!(fetcher.calls(), 2);
    assert_eq!(store.outline(&main).unwrap(), "Baum\n  tree\n");
}

#[tokio::test]
async fn edited_main_word_is_translated_again() {
    let fetcher = CannedFetcher::default()
        .with_page("Haus", HAUS_PAGE)
        .with_page("Baum", BAUM_PAGE);
    let state = app_state();
    let controller = AppController::new(state.clone(), Arc::new(fetcher)).await.unwrap();
    let _tasks = controller.spawn_tasks();
    let done = controller.receiver();

    controller
        .sender()
        .send(AppEvent::AddWords(vec!["Haus".to_string()]))
        .await
        .unwrap();
    completion(&done).await;

    let main = NodeAddress::main_word(0);
    state
        .store
        .set_attribute(&main, Attribute::Word("Baum".to_string()))
        .unwrap();
    completion(&done).await;

    assert_eq!(state.store.outline(&main).unwrap(), "Baum\n  tree\n");
    controller.shutdown();
}
