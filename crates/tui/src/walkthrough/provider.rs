//! Walkthrough sources and completion callbacks.

use lumen_util::{CompletionStore, completion_key};
use tracing::warn;

use super::step::Step;

/// Supplies the steps of a walkthrough and identifies it for completion
/// tracking.
pub trait WalkthroughProvider {
    /// Steps to show, built fresh for every run.
    fn walkthrough_steps(&self) -> Vec<Step>;

    /// Name the completion flag is stored under. Defaults to the type name
    /// without its module path or generic arguments.
    fn walkthrough_identity(&self) -> String {
        short_type_name(std::any::type_name::<Self>()).to_string()
    }

    fn completion_key(&self) -> String {
        completion_key(&self.walkthrough_identity())
    }

    /// Unreadable flags count as not completed.
    fn has_completed_walkthrough(&self, store: &dyn CompletionStore) -> bool {
        let key = self.completion_key();
        store.is_completed(&key).unwrap_or_else(|error| {
            warn!(%key, %error, "could not read walkthrough completion flag");
            false
        })
    }

    fn set_completed_walkthrough(&self, store: &dyn CompletionStore, completed: bool) {
        let key = self.completion_key();
        if let Err(error) = store.set_completed(&key, completed) {
            warn!(%key, %error, "could not store walkthrough completion flag");
        }
    }
}

/// Notified once when a walkthrough runs to its end.
pub trait WalkthroughDelegate {
    fn walkthrough_completed(&mut self);
}

impl<F: FnMut()> WalkthroughDelegate for F {
    fn walkthrough_completed(&mut self) {
        self()
    }
}

fn short_type_name(full: &str) -> &str {
    let without_generics = full.split('<').next().unwrap_or(full);
    without_generics.rsplit("::").next().unwrap_or(without_generics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_util::InMemoryCompletionStore;

    struct OnboardingScreen;

    impl WalkthroughProvider for OnboardingScreen {
        fn walkthrough_steps(&self) -> Vec<Step> {
            Vec::new()
        }
    }

    struct Named;

    impl WalkthroughProvider for Named {
        fn walkthrough_steps(&self) -> Vec<Step> {
            Vec::new()
        }

        fn walkthrough_identity(&self) -> String {
            "settings".into()
        }
    }

    #[test]
    fn identity_defaults_to_short_type_name() {
        assert_eq!(OnboardingScreen.walkthrough_identity(), "OnboardingScreen");
        assert_eq!(OnboardingScreen.completion_key(), "OnboardingScreen-WalkthroughCompleted");
        assert_eq!(short_type_name("a::b::Screen<c::D>"), "Screen");
    }

    #[test]
    fn completion_flag_round_trips_through_the_store() {
        let store = InMemoryCompletionStore::new();
        assert!(!Named.has_completed_walkthrough(&store));

        Named.set_completed_walkthrough(&store, true);
        assert!(Named.has_completed_walkthrough(&store));
        assert!(!OnboardingScreen.has_completed_walkthrough(&store));
        assert!(store.is_completed("settings-WalkthroughCompleted").unwrap());
    }

    #[test]
    fn closures_are_delegates() {
        let mut calls = 0;
        {
            let mut delegate = || calls += 1;
            delegate.walkthrough_completed();
            delegate.walkthrough_completed();
        }
        assert_eq!(calls, 2);
    }
}
