//! Fixed logical endpoints exposed by the battle server.

/// HTTP verb used by an endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
pub enum Endpoint {
    BattleStart,
    BattleState,
    Entities,
    Move,
    Attack,
    Ability,
    EndTurn,
    AbilityList,
}

impl Endpoint {
    pub const fn path(self) -> &'static str {
        match self {
            Self::BattleStart => "/battle/start",
            Self::BattleState => "/battle/state",
            Self::Entities => "/entities",
            Self::Move => "/battle/action/move",
            Self::Attack => "/battle/action/attack",
            Self::Ability => "/battle/action/ability",
            Self::EndTurn => "/battle/turn/end",
            Self::AbilityList => "/data/abilities/list",
        }
    }

    /// Verb the server expects for this endpoint.
    pub const fn method(self) -> Method {
        match self {
            Self::BattleState | Self::Entities | Self::AbilityList => Method::Get,
            Self::BattleStart | Self::Move | Self::Attack | Self::Ability | Self::EndTurn => {
                Method::Post
            }
        }
    }
}
