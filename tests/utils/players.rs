use guessthecraft::{
    transport::{AnnouncementKind, OutboundEvent},
    ChannelHub,
};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// What the simulated players do when a round starts
#[derive(Debug, Clone, Copy)]
pub enum Answer {
    /// Nobody answers, the round times out
    Silence,
    /// `player` posts `content` in `channel`
    Says {
        channel: &'static str,
        player: &'static str,
        content: &'static str,
    },
}

/// Plays one scripted answer per announced round, in order
pub fn answer_rounds(
    hub: ChannelHub,
    mut shown: broadcast::Receiver<OutboundEvent>,
    script: Vec<Vec<Answer>>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut script = script.into_iter();
        while let Ok(event) = shown.recv().await {
            let OutboundEvent::Announced { announcement, .. } = event else {
                continue;
            };
            if announcement.kind != AnnouncementKind::RoundStarted {
                continue;
            }
            let Some(answers) = script.next() else {
                return;
            };
            for answer in answers {
                if let Answer::Says {
                    channel,
                    player,
                    content,
                } = answer
                {
                    hub.publish_message(channel, player, content).await;
                }
            }
        }
    })
}
