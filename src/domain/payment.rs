use serde::{Deserialize, Serialize};

/// Payment gateways offered on the upgrade page. None of them move money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentGateway {
  Razorpay,
  MockPay,
}

#[derive(Debug, Clone, Serialize)]
pub struct GatewayInfo {
  pub id: PaymentGateway,
  pub name: &'static str,
  pub description: &'static str,
  pub fees: &'static str,
  pub features: &'static [&'static str],
}

impl PaymentGateway {
  pub const ALL: [PaymentGateway; 2] = [Self::Razorpay, Self::MockPay];

  pub fn info(&self) -> GatewayInfo {
    match self {
      Self::Razorpay => GatewayInfo {
        id: *self,
        name: "Razorpay",
        description: "Popular in India and Southeast Asia",
        fees: "2% + ₹2",
        features: &["UPI", "Cards", "Net Banking", "Wallets", "EMI"],
      },
      Self::MockPay => GatewayInfo {
        id: *self,
        name: "Mock Payment",
        description: "Free testing gateway (demo only)",
        fees: "Free",
        features: &["Testing Only", "No Real Transactions", "Development Mode"],
      },
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_gateway_wire_names() {
    let g: PaymentGateway = serde_json::from_str("\"mock-pay\"").unwrap();
    assert_eq!(g, PaymentGateway::MockPay);
    let g: PaymentGateway = serde_json::from_str("\"razorpay\"").unwrap();
    assert_eq!(g, PaymentGateway::Razorpay);
    assert!(serde_json::from_str::<PaymentGateway>("\"stripe\"").is_err());
  }

  #[test]
  fn test_gateway_info_ids_match() {
    for g in PaymentGateway::ALL {
      assert_eq!(g.info().id, g);
    }
  }
}
