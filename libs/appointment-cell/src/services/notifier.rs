use chrono::NaiveDate;
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

use crate::models::AvailabilityChanged;

const DEFAULT_CAPACITY: usize = 256;

/// Fan-out of "slots changed for this barber and date" events. Publishing
/// never blocks; subscribers that fall behind are told they lagged.
#[derive(Clone)]
pub struct AvailabilityNotifier {
    sender: broadcast::Sender<AvailabilityChanged>,
}

impl Default for AvailabilityNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl AvailabilityNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn publish(&self, barber_id: Uuid, date: NaiveDate) {
        let event = AvailabilityChanged { barber_id, date };
        match self.sender.send(event) {
            Ok(receivers) => debug!("Availability change for {} on {} sent to {} subscribers", barber_id, date, receivers),
            Err(_) => debug!("Availability change for {} on {} had no subscribers", barber_id, date),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AvailabilityChanged> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let notifier = AvailabilityNotifier::default();
        let mut receiver = notifier.subscribe();
        let barber_id = Uuid::new_v4();
        let date = NaiveDate::from_ymd_opt(2030, 1, 7).unwrap();

        notifier.publish(barber_id, date);

        let event = receiver.recv().await.unwrap();
        assert_eq!(event, AvailabilityChanged { barber_id, date });
    }

    #[test]
    fn publishing_without_subscribers_is_harmless() {
        let notifier = AvailabilityNotifier::new(4);
        assert_eq!(notifier.subscriber_count(), 0);
        notifier.publish(Uuid::new_v4(), NaiveDate::from_ymd_opt(2030, 1, 7).unwrap());
    }
}
