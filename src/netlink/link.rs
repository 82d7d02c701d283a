//! Link message decoding

use crate::netlink::{Link, LinkKind};
use rtnetlink::packet_route::link::{
    InfoData, InfoKind, InfoVrf, LinkAttribute, LinkInfo, LinkMessage,
};

/// Convert a kernel link message into a [`Link`]
pub fn link_from_message(msg: &LinkMessage) -> Link {
    let name = msg
        .attributes
        .iter()
        .find_map(|a| match a {
            LinkAttribute::IfName(name) => Some(name.clone()),
            _ => None,
        })
        .unwrap_or_default();

    Link {
        index: msg.header.index,
        name,
        kind: link_kind(msg),
    }
}

fn link_kind(msg: &LinkMessage) -> LinkKind {
    let infos = msg.attributes.iter().find_map(|a| match a {
        LinkAttribute::LinkInfo(infos) => Some(infos),
        _ => None,
    });

    let Some(infos) = infos else {
        return LinkKind::Standard;
    };

    let is_vrf = infos
        .iter()
        .any(|info| matches!(info, LinkInfo::Kind(InfoKind::Vrf)));
    if !is_vrf {
        return LinkKind::Standard;
    }

    let table_id = infos.iter().find_map(|info| match info {
        LinkInfo::Data(InfoData::Vrf(attrs)) => attrs.iter().find_map(|attr| match attr {
            InfoVrf::TableId(id) => Some(*id),
            _ => None,
        }),
        _ => None,
    });

    LinkKind::Vrf { table_id }
}
