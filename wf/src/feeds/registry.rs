//! Source registry: the travel bloggers whose feeds are searched
//!
//! Ids are the 24-character profile ids from
//! `xiaohongshu.com/user/profile/<id>`.

use serde::Serialize;

/// One feed source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceEntry {
    pub id: &'static str,
    pub name: &'static str,
    pub tags: &'static [&'static str],
}

impl SourceEntry {
    pub const fn new(id: &'static str, name: &'static str, tags: &'static [&'static str]) -> Self {
        Self { id, name, tags }
    }

    pub fn tag_list(&self) -> Vec<String> {
        self.tags.iter().map(|t| t.to_string()).collect()
    }
}

const SOURCES: &[SourceEntry] = &[
    SourceEntry::new("593032945e87e77791e03696", "小宇菇菇", &["旅游", "攻略"]),
    SourceEntry::new("5aec57f04eacab43557f7b77", "嬉游小助理", &["机酒攻略", "专业"]),
    SourceEntry::new("52f59215b4c4d66b2eafa21d", "小墨与阿猴", &["摄影", "情侣游"]),
    SourceEntry::new("5acf498411be105586e79b4c", "这里是新疆", &["新疆", "垂直攻略"]),
    SourceEntry::new("5bf9ff7e999837000189d106", "房琪kiki", &["治愈", "文案", "小众"]),
    SourceEntry::new("616cdf5a000000001f03a074", "小🐑爱溜达～", &["北京", "本地生活"]),
    SourceEntry::new("5af05c664eacab116931c0d0", "小鹿Lawrence", &["环球旅行", "影像", "摄影"]),
    SourceEntry::new("5f0a7dfb0000000001007eaa", "Linksphotograph", &["风光摄影", "极限探索"]),
    SourceEntry::new("6613e7610000000003033ddc", "贝贝贝贝贝 (攻略版)", &["攻略", "打卡"]),
    SourceEntry::new("64239daf00000000120120dd", "旅行搭子小爱酱", &["江浙沪", "省钱攻略"]),
    SourceEntry::new("5ffd4e370000000001008dbc", "Eden的环球旅行", &["环球旅行", "攻略", "生活方式"]),
];

/// The built-in registry, in search order
pub fn sources() -> &'static [SourceEntry] {
    SOURCES
}
