//! The state behind a "to-dos of the day" view
//!
//! A [`TodoView`] holds what a rendering layer displays (the selected date, the to-dos of that date and the title being typed),
//! and turns user actions into requests to a [`TodoSource`].
//!
//! The displayed list is never patched locally: every mutation is followed by a full fetch of the selected date,
//! and the list is replaced by whatever the source answered.

use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;

use crate::config::AddDatePolicy;
use crate::feedback::{FeedbackSender, Operation, OperationProgress};
use crate::todo::{Todo, TodoId};
use crate::traits::TodoSource;
use crate::utils::today;

struct ViewState {
    selected_date: NaiveDate,
    todos: Vec<Todo>,
    draft_title: String,

    /// Tag of the most recently issued list fetch
    latest_fetch: u64,
    fetches_in_flight: usize,
}

/// The view-model of a to-do list for a single date.
///
/// Operations take `&self`, so that several of them can be awaited at the same time (e.g. the user clicks faster than the server answers).
/// In this case, list responses may arrive out of order: only the response to the latest fetch is ever displayed.
///
/// Failures never panic nor propagate: they are logged, and reported to the feedback channel (see [`Self::with_feedback`]).
/// The view then keeps displaying the last list it successfully fetched.
pub struct TodoView<S: TodoSource> {
    source: S,
    add_date_policy: AddDatePolicy,
    feedback_channel: Option<FeedbackSender>,

    state: Mutex<ViewState>,
}

impl<S: TodoSource> TodoView<S> {
    /// Create a view that shows today's to-dos.
    ///
    /// This does not fetch anything yet, see [`Self::mount`]
    pub fn new(source: S) -> Self {
        Self {
            source,
            add_date_policy: AddDatePolicy::default(),
            feedback_channel: None,
            state: Mutex::new(ViewState {
                selected_date: today(),
                todos: Vec::new(),
                draft_title: String::new(),
                latest_fetch: 0,
                fetches_in_flight: 0,
            }),
        }
    }

    /// Choose which date new to-dos are created for
    pub fn with_add_date_policy(mut self, policy: AddDatePolicy) -> Self {
        self.add_date_policy = policy;
        self
    }

    /// Report the outcome of every operation to a [`feedback_channel`](crate::feedback::feedback_channel)
    pub fn with_feedback(mut self, sender: FeedbackSender) -> Self {
        self.feedback_channel = Some(sender);
        self
    }

    /// Returns the source this view reads from and writes to
    pub fn source(&self) -> &S { &self.source }

    /// Fetch the to-dos of the initial date. This is meant to be called once, when the view is first displayed
    pub async fn mount(&self) -> bool {
        log::info!("Mounting the to-do view");
        self.refresh().await
    }

    pub fn selected_date(&self) -> NaiveDate {
        self.state().selected_date
    }

    /// The to-dos currently displayed, as returned by the last accepted fetch
    pub fn todos(&self) -> Vec<Todo> {
        self.state().todos.clone()
    }

    pub fn draft_title(&self) -> String {
        self.state().draft_title.clone()
    }

    pub fn set_draft_title<T: ToString>(&self, title: T) {
        self.state().draft_title = title.to_string();
    }

    /// Whether a list fetch is waiting for the server
    pub fn is_loading(&self) -> bool {
        self.state().fetches_in_flight > 0
    }

    /// Display the to-dos of another date.
    ///
    /// Dates in the future are refused. Returns whether the list of `date` is now displayed
    pub async fn select_date(&self, date: NaiveDate) -> bool {
        let progress = self.progress(Operation::SelectDate(date));
        if date > today() {
            progress.rejected("dates in the future cannot be selected");
            return false;
        }

        self.state().selected_date = date;
        progress.succeeded();
        self.refresh_list(date).await
    }

    /// Fetch the to-dos of the selected date
    pub async fn refresh(&self) -> bool {
        let date = self.selected_date();
        self.refresh_list(date).await
    }

    /// Fetch the to-dos of `date`, and display them.
    ///
    /// Only the selected date can be fetched: other dates are ignored without any request.
    /// The outcome of a fetch is ignored in case another fetch has been issued in the meantime, or in case `date` is not the selected date anymore.
    /// Returns whether the displayed list has been replaced
    pub async fn refresh_list(&self, date: NaiveDate) -> bool {
        let progress = self.progress(Operation::Refresh(date));
        let tag = {
            let mut state = self.state();
            if date != state.selected_date {
                log::debug!("Not fetching {}, which is not the selected date", date);
                return false;
            }
            state.latest_fetch += 1;
            state.fetches_in_flight += 1;
            state.latest_fetch
        };
        progress.started();

        let result = self.source.list_todos(date).await;

        let mut state = self.state();
        state.fetches_in_flight -= 1;
        if tag != state.latest_fetch || date != state.selected_date {
            drop(state);
            if let Err(err) = result {
                log::debug!("Outdated fetch of {} failed: {}", date, err);
            }
            progress.discarded();
            return false;
        }

        match result {
            Err(err) => {
                drop(state);
                progress.failed(&err.to_string());
                false
            },
            Ok(todos) => {
                log::info!("Displaying {} to-do(s) for {}", todos.len(), date);
                state.todos = todos;
                drop(state);
                progress.succeeded();
                true
            },
        }
    }

    /// Create a to-do from the current draft title
    pub async fn submit_draft(&self) -> bool {
        let title = self.draft_title();
        self.add_todo(&title).await
    }

    /// Create a to-do, then refresh the list.
    ///
    /// Blank titles are refused before anything is sent.
    /// The new to-do is dated according to the [`AddDatePolicy`] of this view, which may not be the displayed date.
    pub async fn add_todo(&self, title: &str) -> bool {
        let progress = self.progress(Operation::Add{ title: title.to_string() });
        if title.trim().is_empty() {
            progress.rejected("Please enter a todo title");
            return false;
        }

        let date = match self.add_date_policy {
            AddDatePolicy::Today => today(),
            AddDatePolicy::SelectedDate => self.selected_date(),
        };

        progress.started();
        if let Err(err) = self.source.add_todo(title, date).await {
            progress.failed(&err.to_string());
            return false;
        }
        progress.succeeded();

        self.state().draft_title.clear();
        self.refresh().await
    }

    /// Flip the completion status of a to-do, then refresh the list.
    ///
    /// `current_completed` is the status the user saw, the server is asked to store its opposite
    pub async fn toggle_completed(&self, id: &TodoId, current_completed: bool) -> bool {
        let progress = self.progress(Operation::Toggle(id.clone()));
        progress.started();
        if let Err(err) = self.source.set_completed(id, !current_completed).await {
            progress.failed(&err.to_string());
            return false;
        }
        progress.succeeded();

        self.refresh().await
    }

    /// Delete a to-do, then refresh the list
    pub async fn delete_todo(&self, id: &TodoId) -> bool {
        let progress = self.progress(Operation::Delete(id.clone()));
        progress.started();
        if let Err(err) = self.source.delete_todo(id).await {
            progress.failed(&err.to_string());
            return false;
        }
        progress.succeeded();

        self.refresh().await
    }


    fn progress(&self, operation: Operation) -> OperationProgress<'_> {
        OperationProgress::new(operation, self.feedback_channel.as_ref())
    }

    fn state(&self) -> MutexGuard<'_, ViewState> {
        // The state is always left consistent, so that a poisoned lock can still be used
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use chrono::Duration as DateDuration;

    use crate::feedback::{feedback_channel, ViewEvent};
    use crate::memory::{MemorySource, Request};
    use crate::mock_behaviour::MockBehaviour;

    fn yesterday() -> NaiveDate {
        today() - DateDuration::days(1)
    }

    fn todos_of(source: &MemorySource, date: NaiveDate) -> Vec<Todo> {
        source.todos().into_iter().filter(|t| t.date() == date).collect()
    }

    fn populated_view() -> TodoView<MemorySource> {
        let source = MemorySource::new();
        source.insert("Water the plants", false, today());
        source.insert("Buy bread", true, today());
        source.insert("Pay rent", false, yesterday());
        TodoView::new(source)
    }

    #[tokio::test]
    async fn mount_displays_todays_todos() {
        let _ = env_logger::builder().is_test(true).try_init();

        let view = populated_view();
        assert_eq!(view.selected_date(), today());
        assert!(view.todos().is_empty());

        assert!(view.mount().await);
        assert_eq!(view.todos(), todos_of(view.source(), today()));
        assert_eq!(view.todos().len(), 2);
        assert!(view.is_loading() == false);
    }

    #[tokio::test]
    async fn select_date_displays_the_server_list() {
        let _ = env_logger::builder().is_test(true).try_init();

        let view = populated_view();
        view.mount().await;

        assert!(view.select_date(yesterday()).await);
        assert_eq!(view.selected_date(), yesterday());
        assert_eq!(view.todos(), todos_of(view.source(), yesterday()));

        let old_date = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        assert!(view.select_date(old_date).await);
        assert!(view.todos().is_empty());
    }

    #[tokio::test]
    async fn future_dates_are_rejected() {
        let _ = env_logger::builder().is_test(true).try_init();

        let (sender, receiver) = feedback_channel();
        let view = populated_view().with_feedback(sender);
        view.mount().await;
        let n_requests = view.source().requests().len();
        let displayed = view.todos();

        let tomorrow = today() + DateDuration::days(1);
        assert!(view.select_date(tomorrow).await == false);
        assert_eq!(view.selected_date(), today());
        assert_eq!(view.todos(), displayed);
        assert_eq!(view.source().requests().len(), n_requests);
        assert_eq!(*receiver.borrow(), ViewEvent::Rejected{
            operation: Operation::SelectDate(tomorrow),
            reason: "dates in the future cannot be selected".to_string(),
        });
    }

    #[tokio::test]
    async fn add_then_refresh() {
        let _ = env_logger::builder().is_test(true).try_init();

        let view = populated_view();
        view.mount().await;
        view.set_draft_title("Call the plumber");

        assert!(view.submit_draft().await);
        assert_eq!(view.draft_title(), "");

        let added: Vec<Todo> = view.todos().into_iter().filter(|t| t.title() == "Call the plumber").collect();
        assert_eq!(added.len(), 1);
        assert_eq!(added[0].completed(), false);
        assert_eq!(added[0].date(), today());
        assert_eq!(view.todos().len(), 3);

        // The add is followed by a fetch of the selected date
        let requests = view.source().requests();
        assert_eq!(requests[requests.len() - 2], Request::Add{ title: "Call the plumber".to_string(), date: today() });
        assert_eq!(requests[requests.len() - 1], Request::List(today()));
    }

    #[tokio::test]
    async fn add_is_dated_today_by_default() {
        let _ = env_logger::builder().is_test(true).try_init();

        let view = populated_view();
        view.select_date(yesterday()).await;
        let displayed = view.todos();

        assert!(view.add_todo("Renew passport").await);
        assert!(view.source().requests().contains(&Request::Add{ title: "Renew passport".to_string(), date: today() }));
        // Still viewing yesterday, where the new to-do does not belong
        assert_eq!(view.todos(), displayed);
        assert!(todos_of(view.source(), today()).iter().any(|t| t.title() == "Renew passport"));
    }

    #[tokio::test]
    async fn add_can_target_the_selected_date() {
        let _ = env_logger::builder().is_test(true).try_init();

        let view = populated_view().with_add_date_policy(AddDatePolicy::SelectedDate);
        view.select_date(yesterday()).await;

        assert!(view.add_todo("Renew passport").await);
        assert!(view.source().requests().contains(&Request::Add{ title: "Renew passport".to_string(), date: yesterday() }));
        assert!(view.todos().iter().any(|t| t.title() == "Renew passport" && t.date() == yesterday()));
    }

    #[tokio::test]
    async fn blank_titles_are_rejected() {
        let _ = env_logger::builder().is_test(true).try_init();

        let (sender, receiver) = feedback_channel();
        let view = populated_view().with_feedback(sender);
        view.mount().await;
        let n_requests = view.source().requests().len();
        let displayed = view.todos();

        for title in &["", "   ", "\t\n"] {
            view.set_draft_title(title);
            assert!(view.submit_draft().await == false);
            assert!(receiver.borrow().is_error());
        }
        assert_eq!(view.source().requests().len(), n_requests);
        assert_eq!(view.todos(), displayed);
        // The draft is kept, so that the user can fix it
        assert_eq!(view.draft_title(), "\t\n");
    }

    #[tokio::test]
    async fn toggle_scenario() {
        let _ = env_logger::builder().is_test(true).try_init();

        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let source = MemorySource::new();
        let id = source.insert("Buy milk", false, date);
        assert_eq!(id, TodoId::from(1));
        let view = TodoView::new(source);

        assert!(view.select_date(date).await);
        assert_eq!(view.todos(), vec![Todo::new(TodoId::from(1), "Buy milk".to_string(), false, date)]);

        assert!(view.toggle_completed(&id, false).await);
        assert!(view.source().requests().contains(&Request::SetCompleted{ id: id.clone(), completed: true }));
        assert_eq!(view.todos(), vec![Todo::new(TodoId::from(1), "Buy milk".to_string(), true, date)]);
    }

    #[tokio::test]
    async fn double_toggle_is_a_no_op() {
        let _ = env_logger::builder().is_test(true).try_init();

        let view = populated_view();
        view.mount().await;
        let before = view.todos();

        for _ in 0..2 {
            let todo = view.todos()[0].clone();
            assert!(view.toggle_completed(todo.id(), todo.completed()).await);
        }
        assert_eq!(view.todos(), before);
    }

    #[tokio::test]
    async fn delete_then_refresh() {
        let _ = env_logger::builder().is_test(true).try_init();

        let (sender, receiver) = feedback_channel();
        let view = populated_view().with_feedback(sender);
        view.mount().await;

        let id = view.todos()[0].id().clone();
        assert!(view.delete_todo(&id).await);
        assert!(view.todos().iter().all(|t| t.id() != &id));
        assert_eq!(view.todos().len(), 1);

        // Deleting it again is a (reported) failure, and nothing else
        let displayed = view.todos();
        assert!(view.delete_todo(&id).await == false);
        assert_eq!(view.todos(), displayed);
        match &*receiver.borrow() {
            ViewEvent::Failed{ operation, .. } => assert_eq!(operation, &Operation::Delete(id.clone())),
            other => panic!("Unexpected event {:?}", other),
        };
    }

    #[tokio::test]
    async fn failures_keep_the_last_list() {
        let _ = env_logger::builder().is_test(true).try_init();

        let (sender, receiver) = feedback_channel();
        let view = populated_view().with_feedback(sender);
        view.mount().await;
        let displayed = view.todos();

        view.source().set_mock_behaviour(MockBehaviour::fail_now(1));
        assert!(view.select_date(yesterday()).await == false);
        assert_eq!(view.selected_date(), yesterday());
        assert_eq!(view.todos(), displayed);
        assert!(receiver.borrow().is_error());

        // No retry happens, but the next attempt works
        assert!(view.refresh().await);
        assert_eq!(view.todos(), todos_of(view.source(), yesterday()));
    }

    #[tokio::test]
    async fn failed_mutations_do_not_refresh() {
        let _ = env_logger::builder().is_test(true).try_init();

        let view = populated_view();
        view.mount().await;
        view.set_draft_title("Fix the bike");
        view.source().set_mock_behaviour(MockBehaviour{
            add_todo_behaviour: (0, 1),
            ..MockBehaviour::default()
        });

        assert!(view.submit_draft().await == false);
        assert_eq!(view.draft_title(), "Fix the bike");
        let requests = view.source().requests();
        assert!(matches!(requests.last(), Some(Request::Add{ .. })));
    }

    #[tokio::test]
    async fn outdated_responses_are_discarded() {
        let _ = env_logger::builder().is_test(true).try_init();

        let view = populated_view();
        let slow_date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        view.source().insert("Old stuff", false, slow_date);
        view.source().set_list_delay(slow_date, Duration::from_millis(200));

        let (slow, fast) = tokio::join!(
            view.select_date(slow_date),
            async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                view.select_date(yesterday()).await
            },
        );

        assert!(fast);
        assert!(slow == false);
        assert_eq!(view.selected_date(), yesterday());
        assert_eq!(view.todos(), todos_of(view.source(), yesterday()));
        assert!(view.is_loading() == false);
    }

    #[tokio::test]
    async fn refreshing_another_date_does_not_display_it() {
        let _ = env_logger::builder().is_test(true).try_init();

        let view = populated_view();
        view.mount().await;
        let displayed = view.todos();
        let n_requests = view.source().requests().len();

        assert!(view.refresh_list(yesterday()).await == false);
        assert_eq!(view.todos(), displayed);
        assert_eq!(view.source().requests().len(), n_requests);
    }

    #[tokio::test]
    async fn refreshing_another_date_does_not_hide_the_selected_one() {
        let _ = env_logger::builder().is_test(true).try_init();

        let view = populated_view();
        let slow_date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        view.source().insert("Old stuff", false, slow_date);
        view.source().set_list_delay(slow_date, Duration::from_millis(100));

        let (selected, other) = tokio::join!(
            view.select_date(slow_date),
            async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                view.refresh_list(yesterday()).await
            },
        );

        assert!(selected);
        assert!(other == false);
        assert_eq!(view.selected_date(), slow_date);
        assert_eq!(view.todos(), todos_of(view.source(), slow_date));
        assert_eq!(view.todos().len(), 1);
    }

    #[tokio::test]
    async fn outdated_failures_are_not_reported() {
        let _ = env_logger::builder().is_test(true).try_init();

        let (sender, receiver) = feedback_channel();
        let view = populated_view().with_feedback(sender);
        let slow_date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        view.source().set_list_delay(slow_date, Duration::from_millis(200));
        // The fast listing succeeds, the slow one (answered last) fails
        view.source().set_mock_behaviour(MockBehaviour{
            list_todos_behaviour: (1, 1),
            ..MockBehaviour::default()
        });

        let (slow, fast) = tokio::join!(
            view.select_date(slow_date),
            async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                view.select_date(yesterday()).await
            },
        );

        assert!(fast);
        assert!(slow == false);
        assert_eq!(view.todos(), todos_of(view.source(), yesterday()));
        assert_eq!(*receiver.borrow(), ViewEvent::Discarded(Operation::Refresh(slow_date)));
        assert!(receiver.borrow().is_error() == false);
    }
}
