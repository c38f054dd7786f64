//! Integration tests for [`moderation::ModerationPipeline`].
//!
//! Each test drives messages through the full chain with a fixed clock and asserts on the
//! verdict and on the exact platform calls recorded by [`MockBot`].

mod common;

use std::sync::Arc;

use chrono::Duration;
use combot_core::{TextFormat, Verdict};
use common::mock_bot::{Call, MockBot};
use common::{at, message, pipeline};

/// **Test: Multiplication bait is deleted and nothing else happens.**
///
/// **Action:** "10x your btc now" from a regular member.
/// **Expected:** Delete verdict; exactly one delete call.
#[tokio::test]
async fn test_multiplication_text_is_deleted() {
    let bot = Arc::new(MockBot::new());
    let pipeline = pipeline(bot.clone());

    let msg = message(1, "Ann", Some("10x your btc now"), 0);
    let verdict = pipeline.process_at(&msg, at(0)).await.unwrap();

    assert_eq!(verdict, Verdict::Delete);
    assert_eq!(
        bot.calls(),
        vec![Call::Delete {
            message_id: msg.id.clone()
        }]
    );
}

/// **Test: Three senders flooding the same text inside the window are all muted.**
///
/// **Setup:** threshold 3, window 15s.
/// **Action:** senders 1, 2, 3 post "join our airdrop now" at t=0, 4, 9.
/// **Expected:** first two allowed; third mutes all three, one confirmation per sender.
#[tokio::test]
async fn test_spam_burst_mutes_every_sender() {
    let bot = Arc::new(MockBot::new());
    let pipeline = pipeline(bot.clone());
    let text = "Join our airdrop now";

    for (user_id, name, secs) in [(1, "Ann", 0), (2, "Bob", 4)] {
        let msg = message(user_id, name, Some(text), secs);
        assert_eq!(pipeline.process_at(&msg, at(secs)).await.unwrap(), Verdict::Allow);
    }
    assert!(bot.calls().is_empty());

    let last = message(3, "Cid", Some(text), 9);
    let verdict = pipeline.process_at(&last, at(9)).await.unwrap();
    let until = at(9) + Duration::days(3);
    assert_eq!(
        verdict,
        Verdict::MuteMany {
            user_ids: vec![1, 2, 3],
            until,
            notices: vec![
                "User 1 has been muted for 3 days.".to_string(),
                "User 2 has been muted for 3 days.".to_string(),
                "User 3 has been muted for 3 days.".to_string(),
            ],
        }
    );

    let calls = bot.calls();
    let restricted: Vec<i64> = calls
        .iter()
        .filter_map(|c| match c {
            Call::Restrict { user_id, until: u } if *u == until => Some(*user_id),
            _ => None,
        })
        .collect();
    assert_eq!(restricted, vec![1, 2, 3]);
    let confirmations = calls
        .iter()
        .filter(|c| matches!(c, Call::SendText { format: TextFormat::Plain, .. }))
        .count();
    assert_eq!(confirmations, 3);
}

/// **Test: A flagged text keeps catching new senders after the live burst ended.**
///
/// **Setup:** burst flagged at t=0.
/// **Action:** a fourth sender posts the same text at t=60 (live window empty of peers).
/// **Expected:** only that sender is muted.
#[tokio::test]
async fn test_recent_flag_catches_late_sender() {
    let bot = Arc::new(MockBot::new());
    let pipeline = pipeline(bot.clone());
    let text = "free tokens in bio";

    for (user_id, name) in [(1, "Ann"), (2, "Bob"), (3, "Cid")] {
        pipeline
            .process_at(&message(user_id, name, Some(text), 0), at(0))
            .await
            .unwrap();
    }
    bot.clear();

    let late = message(4, "Dee", Some(text), 60);
    let verdict = pipeline.process_at(&late, at(60)).await.unwrap();
    assert!(matches!(verdict, Verdict::MuteMany { ref user_ids, .. } if user_ids == &vec![4]));

    // Past retention the same text no longer mutes anybody new.
    let later = message(5, "Eve", Some(text), 400);
    let verdict = pipeline.process_at(&later, at(400)).await.unwrap();
    assert_eq!(verdict, Verdict::Allow);
}

/// **Test: A filter trigger answers with its response and is never spam-tracked.**
///
/// **Action:** "/rules" from a regular member.
/// **Expected:** reply "See pinned message."; nothing recorded in the spam window.
#[tokio::test]
async fn test_filter_trigger_replies_without_spam_check() {
    let bot = Arc::new(MockBot::new());
    let pipeline = pipeline(bot.clone());

    let verdict = pipeline
        .process_at(&message(1, "Ann", Some("/rules"), 0), at(0))
        .await
        .unwrap();

    assert!(matches!(verdict, Verdict::Respond(ref r) if r.trigger == "rules"));
    assert_eq!(
        bot.calls(),
        vec![Call::Reply {
            text: "See pinned message.".to_string(),
            format: TextFormat::Plain
        }]
    );
    assert_eq!(pipeline.detector().window_len("/rules"), 0);
}

/// **Test: Filter exemption holds even when the text already sits in a spam window.**
#[tokio::test]
async fn test_filter_exemption_overrides_existing_window() {
    let bot = Arc::new(MockBot::new());
    let pipeline = pipeline(bot.clone());
    let detector = pipeline.detector();
    detector.observe("check the rules", 1, at(0));
    detector.observe("check the rules", 2, at(1));

    let verdict = pipeline
        .process_at(&message(3, "Cid", Some("Check the rules"), 2), at(2))
        .await
        .unwrap();

    assert!(matches!(verdict, Verdict::Respond(_)));
    assert_eq!(detector.window_len("check the rules"), 2);
}

/// **Test: Whitelisted greetings are never muted as a burst.**
#[tokio::test]
async fn test_whitelist_skips_spam_check() {
    let bot = Arc::new(MockBot::new());
    let pipeline = pipeline(bot.clone());

    for (user_id, name) in [(1, "Ann"), (2, "Bob"), (3, "Cid"), (4, "Dee")] {
        let verdict = pipeline
            .process_at(&message(user_id, name, Some("GM"), 1), at(1))
            .await
            .unwrap();
        assert_eq!(verdict, Verdict::Allow);
    }
    assert!(bot.calls().is_empty());
}

/// **Test: Ban phrase beats mute phrase when both lists match.**
///
/// **Setup:** "scam" is on both the ban and mute lists.
/// **Expected:** ban + ban notice; no restrict call.
#[tokio::test]
async fn test_ban_phrase_precedes_mute_phrase() {
    let bot = Arc::new(MockBot::new());
    let pipeline = pipeline(bot.clone());

    let verdict = pipeline
        .process_at(&message(7, "Ann", Some("this is a scam, pure shill"), 0), at(0))
        .await
        .unwrap();

    assert_eq!(
        verdict,
        Verdict::Ban {
            user_id: 7,
            notice: Some("arc angel fallen. Ann has been banned.".to_string())
        }
    );
    assert_eq!(
        bot.calls(),
        vec![
            Call::Ban { user_id: 7 },
            Call::Reply {
                text: "arc angel fallen. Ann has been banned.".to_string(),
                format: TextFormat::Plain
            }
        ]
    );
}

/// **Test: Mute phrase restricts until message time plus the mute duration.**
#[tokio::test]
async fn test_mute_phrase_restricts_sender() {
    let bot = Arc::new(MockBot::new());
    let pipeline = pipeline(bot.clone());

    let msg = message(8, "Bob", Some("stop the shill please"), 30);
    pipeline.process_at(&msg, at(31)).await.unwrap();

    assert_eq!(
        bot.calls(),
        vec![
            Call::Restrict {
                user_id: 8,
                until: at(30) + Duration::days(3)
            },
            Call::Reply {
                text: "Bob has been muted for 3 days.".to_string(),
                format: TextFormat::Plain
            }
        ]
    );
}

/// **Test: Delete phrase deletes; phrases only match whole words.**
#[tokio::test]
async fn test_delete_phrase_is_word_bounded() {
    let bot = Arc::new(MockBot::new());
    let pipeline = pipeline(bot.clone());

    let verdict = pipeline
        .process_at(&message(9, "Cid", Some("pump it"), 0), at(0))
        .await
        .unwrap();
    assert_eq!(verdict, Verdict::Delete);

    let verdict = pipeline
        .process_at(&message(9, "Cid", Some("my pumpkin pie"), 1), at(1))
        .await
        .unwrap();
    assert_eq!(verdict, Verdict::Allow);
}

/// **Test: Administrators skip every block rule but still get filter responses.**
///
/// **Setup:** user 1 is an administrator.
/// **Expected:** ban phrase, multiplication and a burst are allowed; "rules" is answered;
/// a one-character message is still deleted.
#[tokio::test]
async fn test_administrator_exemptions() {
    let bot = Arc::new(MockBot::with_admins([1]));
    let pipeline = pipeline(bot.clone());

    for (secs, text) in [(0, "total scam"), (1, "10x soon"), (2, "same text"), (3, "same text"), (4, "same text")] {
        let verdict = pipeline
            .process_at(&message(1, "Admin", Some(text), secs), at(secs))
            .await
            .unwrap();
        assert_eq!(verdict, Verdict::Allow, "{text}");
    }
    assert!(bot.calls().is_empty());

    let verdict = pipeline
        .process_at(&message(1, "Admin", Some("read the rules"), 5), at(5))
        .await
        .unwrap();
    assert!(matches!(verdict, Verdict::Respond(_)));

    let verdict = pipeline
        .process_at(&message(1, "Admin", Some("k"), 6), at(6))
        .await
        .unwrap();
    assert_eq!(verdict, Verdict::Delete);
}

/// **Test: Impersonating names are banned without a notice.**
#[tokio::test]
async fn test_suspicious_name_is_banned() {
    let bot = Arc::new(MockBot::new());
    let pipeline = pipeline(bot.clone());

    let mut msg = message(11, "Helpdesk", Some("dm me for help"), 0);
    msg.user.username = Some("official_helpdesk".to_string());
    let verdict = pipeline.process_at(&msg, at(0)).await.unwrap();

    assert_eq!(
        verdict,
        Verdict::Ban {
            user_id: 11,
            notice: None
        }
    );
    assert_eq!(bot.calls(), vec![Call::Ban { user_id: 11 }]);
}

/// **Test: Non-text messages are a no-op; too-short text is deleted.**
#[tokio::test]
async fn test_missing_and_short_text() {
    let bot = Arc::new(MockBot::new());
    let pipeline = pipeline(bot.clone());

    let verdict = pipeline
        .process_at(&message(1, "Ann", None, 0), at(0))
        .await
        .unwrap();
    assert_eq!(verdict, Verdict::Allow);
    assert!(bot.calls().is_empty());

    let verdict = pipeline
        .process_at(&message(1, "Ann", Some("  ?  "), 1), at(1))
        .await
        .unwrap();
    assert_eq!(verdict, Verdict::Delete);
}

/// **Test: A failed mute for one spammer does not stop the others.**
#[tokio::test]
async fn test_mute_failure_is_isolated_per_sender() {
    let bot = Arc::new(MockBot::new().failing_restrict_for(2));
    let pipeline = pipeline(bot.clone());
    let text = "claim your reward";

    for (user_id, name) in [(1, "Ann"), (2, "Bob"), (3, "Cid")] {
        pipeline
            .process_at(&message(user_id, name, Some(text), 0), at(0))
            .await
            .unwrap();
    }

    let restricted: Vec<i64> = bot
        .calls()
        .iter()
        .filter_map(|c| match c {
            Call::Restrict { user_id, .. } => Some(*user_id),
            _ => None,
        })
        .collect();
    assert_eq!(restricted, vec![1, 3]);
    let confirmations = bot
        .calls()
        .iter()
        .filter(|c| matches!(c, Call::SendText { .. }))
        .count();
    assert_eq!(confirmations, 2);
}

/// **Test: `/filters` answers with the sorted listing and skips moderation.**
#[tokio::test]
async fn test_filters_command_lists_triggers() {
    let bot = Arc::new(MockBot::new());
    let pipeline = pipeline(bot.clone());

    pipeline
        .dispatch(&message(1, "Ann", Some("/filters"), 0))
        .await
        .unwrap();

    assert_eq!(
        bot.calls(),
        vec![Call::Reply {
            text: "*Available Filters:*\n`/ca`\n`rules`".to_string(),
            format: TextFormat::Markdown
        }]
    );
}
