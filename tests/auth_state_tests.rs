// tests/auth_state_tests.rs
//! Transition table of the verification state machine, no storage involved

use profile_vault::auth::{AuthState, Event, Evidence, Failure, ProfileCheck};
use profile_vault::consts::{RESET_CONFIRMATION_PHRASE, WIPE_CONFIRMATION_PHRASE};
use profile_vault::credential::CredentialCheck::{self, *};
use profile_vault::AuthError;

const MAX: u32 = 4;

fn evidence(credential: CredentialCheck, profiles: ProfileCheck) -> Event {
    Event::Evidence(Evidence::new(credential, profiles))
}

fn first(credential: CredentialCheck, profiles: ProfileCheck) -> AuthState {
    AuthState::Unverified.next(evidence(credential, profiles), MAX)
}

#[test]
fn valid_credential_and_healthy_profiles_authenticate() {
    assert_eq!(first(Valid, ProfileCheck::Decrypts), AuthState::Authenticated);
    assert_eq!(first(Valid, ProfileCheck::NoProfiles), AuthState::Authenticated);
}

#[test]
fn valid_credential_with_unreadable_profiles_is_corruption() {
    assert_eq!(first(Valid, ProfileCheck::Undecryptable), AuthState::ProfileCorrupted);
}

#[test]
fn profile_evidence_offers_credential_repair() {
    for fault in [Missing, Tampered, HashMismatch, SentinelInvalid] {
        assert_eq!(
            first(fault, ProfileCheck::Decrypts),
            AuthState::RepairCredential { fault, attempts: 1 }
        );
    }
}

#[test]
fn without_profiles_a_mismatch_retries_then_fails() {
    let mut state = AuthState::Unverified;
    for attempt in 1..MAX {
        state = state.next(evidence(HashMismatch, ProfileCheck::NoProfiles), MAX);
        assert_eq!(
            state,
            AuthState::Retry {
                attempts: attempt,
                last: HashMismatch
            }
        );
    }
    state = state.next(evidence(HashMismatch, ProfileCheck::NoProfiles), MAX);
    assert_eq!(state, AuthState::Failed(Failure::AuthMismatch { attempts: MAX }));
}

#[test]
fn without_profiles_tamper_and_missing_are_immediate() {
    assert_eq!(
        first(Tampered, ProfileCheck::NoProfiles),
        AuthState::Failed(Failure::IntegrityTamper)
    );
    assert_eq!(
        first(Missing, ProfileCheck::NoProfiles),
        AuthState::Failed(Failure::NotInitialized)
    );
}

#[test]
fn swapped_sentinel_under_matching_hash_is_tamper() {
    assert_eq!(
        first(SentinelInvalid, ProfileCheck::NoProfiles),
        AuthState::Failed(Failure::IntegrityTamper)
    );
    let state = AuthState::Retry {
        attempts: 1,
        last: HashMismatch,
    }
    .next(evidence(SentinelInvalid, ProfileCheck::NoProfiles), MAX);
    assert_eq!(state, AuthState::Failed(Failure::IntegrityTamper));
}

#[test]
fn ambiguous_failure_after_attempt_budget() {
    let mut state = AuthState::Unverified;
    for _ in 1..MAX {
        state = state.next(evidence(HashMismatch, ProfileCheck::Undecryptable), MAX);
        assert!(matches!(state, AuthState::Retry { .. }));
    }
    state = state.next(evidence(HashMismatch, ProfileCheck::Undecryptable), MAX);
    assert_eq!(
        state,
        AuthState::AmbiguousFailure {
            fault: HashMismatch,
            attempts: MAX
        }
    );
}

#[test]
fn retry_can_still_succeed() {
    let state = first(HashMismatch, ProfileCheck::Undecryptable)
        .next(evidence(Valid, ProfileCheck::Decrypts), MAX);
    assert_eq!(state, AuthState::Authenticated);
}

#[test]
fn single_attempt_budget_decides_immediately() {
    let state = AuthState::Unverified.next(evidence(HashMismatch, ProfileCheck::Undecryptable), 1);
    assert!(matches!(state, AuthState::AmbiguousFailure { attempts: 1, .. }));

    // zero is treated as one
    let state = AuthState::Unverified.next(evidence(HashMismatch, ProfileCheck::NoProfiles), 0);
    assert_eq!(state, AuthState::Failed(Failure::AuthMismatch { attempts: 1 }));
}

#[test]
fn repair_path() {
    let repair = first(Tampered, ProfileCheck::Decrypts);

    let regenerating = repair.next(Event::Confirmed(true), MAX);
    assert_eq!(regenerating, AuthState::RegeneratingCredential);
    assert_eq!(
        regenerating.next(evidence(Valid, ProfileCheck::Decrypts), MAX),
        AuthState::Authenticated
    );
    assert_eq!(
        regenerating.next(evidence(Tampered, ProfileCheck::Decrypts), MAX),
        AuthState::Failed(Failure::IntegrityTamper)
    );
}

#[test]
fn declined_repair_names_the_fault() {
    let cases = [
        (Tampered, Failure::IntegrityTamper),
        (Missing, Failure::NotInitialized),
        (HashMismatch, Failure::AuthMismatch { attempts: 1 }),
        (SentinelInvalid, Failure::IntegrityTamper),
    ];
    for (fault, failure) in cases {
        let state = first(fault, ProfileCheck::Decrypts).next(Event::Confirmed(false), MAX);
        assert_eq!(state, AuthState::Failed(failure));
    }
}

#[test]
fn wipe_needs_confirmation_and_phrase() {
    let corrupted = first(Valid, ProfileCheck::Undecryptable);
    assert_eq!(
        corrupted.next(Event::Confirmed(false), MAX),
        AuthState::Failed(Failure::PayloadCorrupt)
    );

    let confirm = corrupted.next(Event::Confirmed(true), MAX);
    assert_eq!(confirm, AuthState::ConfirmWipe);
    assert_eq!(
        confirm.next(Event::Phrase("y".into()), MAX),
        AuthState::Failed(Failure::PayloadCorrupt)
    );
    assert_eq!(
        confirm.next(Event::Phrase(WIPE_CONFIRMATION_PHRASE.to_lowercase()), MAX),
        AuthState::Failed(Failure::PayloadCorrupt)
    );

    let wiping = confirm.next(Event::Phrase(format!("{WIPE_CONFIRMATION_PHRASE}\n")), MAX);
    assert_eq!(wiping, AuthState::WipingProfiles);
    assert_eq!(wiping.next(Event::Completed, MAX), AuthState::ProfilesWiped);
}

#[test]
fn reset_needs_confirmation_and_phrase() {
    let ambiguous = AuthState::AmbiguousFailure {
        fault: HashMismatch,
        attempts: MAX,
    };
    assert_eq!(
        ambiguous.next(Event::Confirmed(false), MAX),
        AuthState::Failed(Failure::AuthMismatch { attempts: MAX })
    );

    let confirm = ambiguous.next(Event::Confirmed(true), MAX);
    assert_eq!(
        confirm,
        AuthState::ConfirmReset {
            fault: HashMismatch,
            attempts: MAX
        }
    );
    assert_eq!(
        confirm.next(Event::Phrase(WIPE_CONFIRMATION_PHRASE.into()), MAX),
        AuthState::Failed(Failure::AuthMismatch { attempts: MAX })
    );

    let resetting = confirm.next(Event::Phrase(RESET_CONFIRMATION_PHRASE.into()), MAX);
    assert_eq!(resetting, AuthState::ResettingVault);
    assert_eq!(resetting.next(Event::Completed, MAX), AuthState::VaultReset);
}

#[test]
fn tampered_ambiguity_declined_is_integrity_failure() {
    let ambiguous = AuthState::AmbiguousFailure {
        fault: Tampered,
        attempts: MAX,
    };
    assert_eq!(
        ambiguous.next(Event::Confirmed(false), MAX),
        AuthState::Failed(Failure::IntegrityTamper)
    );
}

#[test]
fn cancel_from_any_live_state() {
    let live = [
        AuthState::Unverified,
        AuthState::Retry {
            attempts: 2,
            last: HashMismatch,
        },
        AuthState::RepairCredential {
            fault: Tampered,
            attempts: 1,
        },
        AuthState::ProfileCorrupted,
        AuthState::ConfirmWipe,
        AuthState::ConfirmReset {
            fault: HashMismatch,
            attempts: MAX,
        },
    ];
    for state in live {
        assert_eq!(
            state.next(Event::Cancelled, MAX),
            AuthState::Failed(Failure::Cancelled)
        );
    }
}

#[test]
fn terminal_states_absorb_events() {
    let terminal = [
        AuthState::Authenticated,
        AuthState::ProfilesWiped,
        AuthState::VaultReset,
        AuthState::Failed(Failure::PayloadCorrupt),
    ];
    for state in terminal {
        assert!(state.is_terminal());
        assert_eq!(state.next(Event::Cancelled, MAX), state);
        assert_eq!(state.next(evidence(Valid, ProfileCheck::Decrypts), MAX), state);
    }
}

#[test]
fn unrelated_events_are_ignored() {
    assert_eq!(
        AuthState::Unverified.next(Event::Confirmed(true), MAX),
        AuthState::Unverified
    );
    assert_eq!(
        AuthState::ProfileCorrupted.next(Event::Phrase(WIPE_CONFIRMATION_PHRASE.into()), MAX),
        AuthState::ProfileCorrupted
    );
    assert_eq!(
        AuthState::WipingProfiles.next(Event::Confirmed(true), MAX),
        AuthState::WipingProfiles
    );
}

#[test]
fn failures_map_to_exit_codes() {
    let codes = [
        (Failure::AuthMismatch { attempts: 4 }, 2),
        (Failure::IntegrityTamper, 3),
        (Failure::PayloadCorrupt, 4),
        (Failure::NotInitialized, 5),
        (Failure::Cancelled, 130),
    ];
    for (failure, code) in codes {
        assert_eq!(AuthError::from(failure).exit_code(), code);
    }
}
