use std::collections::HashSet;

use super::store::Ticket;

/// 计算可参与随机抽奖的号码
///
/// - 已在随机抽奖中中过奖的号码排除（手动中奖不影响）
/// - `require_paid` 时仅保留 PAGADO
///
/// 返回顺序无意义，公平性由抽样保证
pub fn resolve_eligible(tickets: &[Ticket], require_paid: bool) -> Vec<Ticket> {
    let already_won_randomly: HashSet<i64> = tickets
        .iter()
        .filter(|t| t.has_random_win())
        .map(|t| t.id)
        .collect();

    tickets
        .iter()
        .filter(|t| !already_won_randomly.contains(&t.id))
        .filter(|t| !require_paid || t.is_paid())
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draw::store::WinnerRecord;
    use crate::entities::TicketStatus;
    use chrono::Utc;

    fn ticket(id: i64, status: TicketStatus) -> Ticket {
        Ticket {
            id,
            number: id as i32,
            status,
            buyer_name: None,
            buyer_phone: None,
            wins: vec![],
        }
    }

    fn win(ticket_id: i64, is_manual: bool) -> WinnerRecord {
        WinnerRecord {
            id: ticket_id * 100,
            raffle_id: "r1".into(),
            ticket_id,
            is_manual,
            won_at: Utc::now(),
        }
    }

    fn numbers(tickets: &[Ticket]) -> Vec<i32> {
        let mut n: Vec<i32> = tickets.iter().map(|t| t.number).collect();
        n.sort();
        n
    }

    #[test]
    fn test_paid_filter() {
        let tickets = vec![
            ticket(1, TicketStatus::Pagado),
            ticket(2, TicketStatus::Revisando),
            ticket(3, TicketStatus::Apartado),
            ticket(4, TicketStatus::Pagado),
        ];
        assert_eq!(numbers(&resolve_eligible(&tickets, true)), vec![1, 4]);
        assert_eq!(numbers(&resolve_eligible(&tickets, false)), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_random_winner_excluded() {
        let mut t1 = ticket(1, TicketStatus::Pagado);
        t1.wins.push(win(1, false));
        let tickets = vec![t1, ticket(2, TicketStatus::Pagado)];

        assert_eq!(numbers(&resolve_eligible(&tickets, false)), vec![2]);
        assert_eq!(numbers(&resolve_eligible(&tickets, true)), vec![2]);
    }

    #[test]
    fn test_manual_win_does_not_block() {
        let mut t1 = ticket(1, TicketStatus::Pagado);
        t1.wins.push(win(1, true));
        let tickets = vec![t1];

        assert_eq!(numbers(&resolve_eligible(&tickets, true)), vec![1]);
    }

    #[test]
    fn test_empty_input() {
        assert!(resolve_eligible(&[], true).is_empty());
        assert!(resolve_eligible(&[], false).is_empty());
    }
}
