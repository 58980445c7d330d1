//! The static fortune catalog.
//!
//! Twenty-four slips across four tiers. Entries are defined at build time
//! and never mutated; everything here is pure lookup.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Slip tier, from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    /// 上上
    #[serde(rename = "上上")]
    Supreme,
    /// 上签
    #[serde(rename = "上签")]
    Upper,
    /// 中平
    #[serde(rename = "中平")]
    Middling,
    /// 下签
    #[serde(rename = "下签")]
    Lower,
}

impl Tier {
    /// The short tier name as printed on the slip.
    pub fn name(self) -> &'static str {
        match self {
            Tier::Supreme => "上上",
            Tier::Upper => "上签",
            Tier::Middling => "中平",
            Tier::Lower => "下签",
        }
    }

    /// The full badge label.
    pub fn label(self) -> &'static str {
        match self {
            Tier::Supreme => "上上签",
            Tier::Upper => "上签",
            Tier::Middling => "中平签",
            Tier::Lower => "下签",
        }
    }

    /// Collapse the tier into the binary calendar marker.
    pub fn level(self) -> Level {
        match self {
            Tier::Supreme | Tier::Upper => Level::Auspicious,
            Tier::Middling | Tier::Lower => Level::Inauspicious,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Binary auspicious/inauspicious classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Auspicious,
    Inauspicious,
}

impl Level {
    pub fn glyph(self) -> &'static str {
        match self {
            Level::Auspicious => "吉",
            Level::Inauspicious => "凶",
        }
    }
}

/// One fortune slip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fortune {
    /// Slip number, unique across the catalog.
    pub id: u32,
    pub tier: Tier,
    pub title: &'static str,
    /// Phrase-delimited poem; split with [`split_poem_lines`] for display.
    pub poem: &'static str,
    pub meaning: &'static str,
}

impl Fortune {
    pub fn level(&self) -> Level {
        self.tier.level()
    }
}

/// Look up a fortune by slip number.
pub fn fortune_by_id(id: u32) -> Option<&'static Fortune> {
    FORTUNES.iter().find(|f| f.id == id)
}

/// Split a poem into display lines at phrase boundaries.
pub fn split_poem_lines(poem: &str) -> Vec<&str> {
    poem.split(['，', '。', '；', '、'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Pick a fortune uniformly at random, excluding `excluded` ids.
///
/// When exclusion would leave no candidates the whole catalog is used, so
/// this always yields a slip.
pub fn random_fortune(excluded: &[u32], rng: &mut impl Rng) -> &'static Fortune {
    let candidates: Vec<&'static Fortune> = FORTUNES
        .iter()
        .filter(|f| !excluded.contains(&f.id))
        .collect();

    if candidates.is_empty() {
        FORTUNES.choose(rng).expect("catalog is never empty")
    } else {
        *candidates.choose(rng).expect("candidates checked non-empty")
    }
}

/// The full catalog, in slip-number order.
pub static FORTUNES: &[Fortune] = &[
    Fortune {
        id: 1,
        tier: Tier::Supreme,
        title: "云开见月",
        poem: "云开雾散月华明，万里晴空一鉴平，旧事浮沉皆已定，扬帆此去尽东风",
        meaning: "久困之局豁然开朗，此前的纠结会自然解开。宜主动推进搁置的计划，贵人就在身边。",
    },
    Fortune {
        id: 2,
        tier: Tier::Supreme,
        title: "枯木逢春",
        poem: "枯木逢春又发芽，寒枝昨夜绽新花，莫道前路无知己，春风一度到天涯",
        meaning: "看似无望之事正在悄悄转机。坚持原本的方向，不必改弦更张，时间站在你这边。",
    },
    Fortune {
        id: 3,
        tier: Tier::Supreme,
        title: "锦鲤跃渊",
        poem: "锦鲤深渊跃此身，一朝化羽上青云，平生所学今得用，不负灯前十年心",
        meaning: "努力积累的东西即将被看见。适合应试、述职、展示自己，放胆去争取。",
    },
    Fortune {
        id: 4,
        tier: Tier::Supreme,
        title: "明珠出匣",
        poem: "明珠藏匣久无光，一旦开时照四方，自有识者来相顾，何须自叹委尘霜",
        meaning: "你的价值无需自证，懂的人自然会来。近期有意外的认可或邀约，坦然接住即可。",
    },
    Fortune {
        id: 5,
        tier: Tier::Upper,
        title: "顺水行舟",
        poem: "顺水行舟不用篙，轻风送我过山坳，前程自有安排处，且把眉头一并抛",
        meaning: "诸事顺遂，不必过度用力。放下控制欲，顺势而为反而走得更快。",
    },
    Fortune {
        id: 6,
        tier: Tier::Upper,
        title: "春山可望",
        poem: "春山缥缈翠如描，此去登临路不遥，莫因微雨迟行箸，山顶风光胜山腰",
        meaning: "目标比想象中近，但途中会有小干扰。别被琐事绊住脚步，坚持到更高处再休息。",
    },
    Fortune {
        id: 7,
        tier: Tier::Upper,
        title: "灯下故人",
        poem: "灯下忽闻故人声，一盏清茶叙旧情，人间风雪多寒夜，有人念你便是晴",
        meaning: "人际运佳，旧友或久未联系的人会带来温暖消息。宜主动问候，勿让情分冷却。",
    },
    Fortune {
        id: 8,
        tier: Tier::Upper,
        title: "新笋破土",
        poem: "新笋破土节节高，不与繁花争艳娇，默默生长人不觉，他年自是凌云梢",
        meaning: "适合低调做事、积蓄力量。眼下的进展别急着展示，沉住气，成果会自己说话。",
    },
    Fortune {
        id: 9,
        tier: Tier::Upper,
        title: "月下信步",
        poem: "月下信步过前溪，风送荷香到客衣，心头若无烦恼事，眼前处处是芳菲",
        meaning: "运势平稳偏上，关键在心境。放过自己一次，许多问题会显得不值一提。",
    },
    Fortune {
        id: 10,
        tier: Tier::Upper,
        title: "好雨知时",
        poem: "好雨知时夜入田，无声润物自绵绵，明朝陇上看新绿，始信天公不负年",
        meaning: "付出正在暗中生效，只是还看不到。别在此时中断投入，收获期比预想的早。",
    },
    Fortune {
        id: 11,
        tier: Tier::Upper,
        title: "鹊登枝头",
        poem: "喜鹊登枝报晓晴，檐前叽喳两三声，小小如意常相伴，莫问琼楼第几层",
        meaning: "有小而确定的喜事，未必惊天动地，但足够甜。记得把好消息分享给在意你的人。",
    },
    Fortune {
        id: 12,
        tier: Tier::Upper,
        title: "渡口有船",
        poem: "行到渡口日未斜，恰有轻舟泊浅沙，莫愁此水无人渡，自有梢公唤你家",
        meaning: "关口处自有人接应。遇到难处不妨开口求助，帮你的人正等着被需要。",
    },
    Fortune {
        id: 13,
        tier: Tier::Upper,
        title: "晴窗理卷",
        poem: "晴窗理卷墨犹香，旧业温来意更长，一寸光阴一寸进，何愁他日不升堂",
        meaning: "宜整理、复盘、补课。回头梳理旧摊子会有意外发现，学习运尤佳。",
    },
    Fortune {
        id: 14,
        tier: Tier::Middling,
        title: "云遮半月",
        poem: "云遮半月半分明，似暗还明夜气清，莫把疑心生暗鬼，云开依旧月盈盈",
        meaning: "信息不全，容易多想。先不下结论，尤其别在深夜做决定，等事情自己亮出来。",
    },
    Fortune {
        id: 15,
        tier: Tier::Middling,
        title: "平湖无波",
        poem: "平湖无波水自流，不喜不悲过小舟，若嫌日子寻常了，寻常恰是福根由",
        meaning: "无功无过的一段平路。平淡不是停滞，是蓄力。照顾好三餐和睡眠就是进步。",
    },
    Fortune {
        id: 16,
        tier: Tier::Middling,
        title: "雾里看山",
        poem: "雾里看山山不真，眼前景物半成尘，不如且坐烹茶去，雾散青山自见因",
        meaning: "眼下看不清就先不看。强行判断易出错，把悬而未决的事放一放，答案会自己浮现。",
    },
    Fortune {
        id: 17,
        tier: Tier::Middling,
        title: "半篙春水",
        poem: "半篙春水慢撑船，欲速行舟反搁浅，潮信自有来时刻，何必忙忙赶在前",
        meaning: "时机未到，急不得。推进中的事会比预期慢半拍，留足余量，勿轻许期限。",
    },
    Fortune {
        id: 18,
        tier: Tier::Middling,
        title: "檐下听雨",
        poem: "檐下听雨且停步，湿了青衫不必苦，一蓑烟雨寻常事，晴日终归在前路",
        meaning: "小挫折在所难免，淋一点雨无碍大局。今天适合低配运转，不适合硬拼。",
    },
    Fortune {
        id: 19,
        tier: Tier::Middling,
        title: "棋至中盘",
        poem: "棋至中盘势未分，黑白纠缠各三分，善弈者争先一手，不争眼下争乾坤",
        meaning: "胶着期，局势未明。别计较一时得失，把精力放在对长远真正重要的那一步上。",
    },
    Fortune {
        id: 20,
        tier: Tier::Middling,
        title: "旧衣御寒",
        poem: "旧衣虽敝尚御寒，未必新裁胜旧衫，且惜手中眼前物，时来自有锦衣穿",
        meaning: "不宜喜新厌旧。现有的条件还能支撑，先别折腾更换，守住存量等待增量。",
    },
    Fortune {
        id: 21,
        tier: Tier::Lower,
        title: "逆风过桥",
        poem: "逆风过桥步步沉，桥下流水急森森，扶栏慢行休回首，过得桥头即安心",
        meaning: "近期阻力偏大，难而不险。放慢节奏，抓稳眼前事，别分心回看沉没成本。",
    },
    Fortune {
        id: 22,
        tier: Tier::Lower,
        title: "浅滩搁舟",
        poem: "浅滩搁舟进退难，强撑篙橹只空弯，不如待得潮头起，稳坐船中莫自烦",
        meaning: "用力越猛越容易消耗自己。当下宜守不宜攻，保存体力，等待涨潮。",
    },
    Fortune {
        id: 23,
        tier: Tier::Lower,
        title: "夜行遇雾",
        poem: "夜行遇雾失前村，咫尺难分路与痕，不如暂驻点灯火，待晓启程路自真",
        meaning: "不宜开新局、签约、远行。看不清就停下来点灯，向信得过的人求证再走。",
    },
    Fortune {
        id: 24,
        tier: Tier::Lower,
        title: "霜打初荷",
        poem: "霜打初荷叶半伤，犹有根藕藏泥塘，一时风冷休惆怅，留得根在待春光",
        meaning: "受点损伤，但根基未动。接受阶段性的失去，养好根本，来年照样发新叶。",
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_unique_and_positive() {
        let ids: HashSet<u32> = FORTUNES.iter().map(|f| f.id).collect();
        assert_eq!(ids.len(), FORTUNES.len());
        assert!(ids.iter().all(|&id| id > 0));
    }

    #[test]
    fn test_fortune_by_id() {
        assert_eq!(fortune_by_id(1).unwrap().title, "云开见月");
        assert!(fortune_by_id(0).is_none());
        assert!(fortune_by_id(999).is_none());
    }

    #[test]
    fn test_level_classifier() {
        assert_eq!(Tier::Supreme.level(), Level::Auspicious);
        assert_eq!(Tier::Upper.level(), Level::Auspicious);
        assert_eq!(Tier::Middling.level(), Level::Inauspicious);
        assert_eq!(Tier::Lower.level(), Level::Inauspicious);
        assert_eq!(Level::Auspicious.glyph(), "吉");
    }

    #[test]
    fn test_tier_serde_uses_slip_names() {
        let json = serde_json::to_string(&Tier::Supreme).unwrap();
        assert_eq!(json, "\"上上\"");
        let tier: Tier = serde_json::from_str("\"中平\"").unwrap();
        assert_eq!(tier, Tier::Middling);
    }

    #[test]
    fn test_split_poem_lines() {
        let lines = split_poem_lines("一句，两句，三句，四句");
        assert_eq!(lines, vec!["一句", "两句", "三句", "四句"]);

        // every catalog poem splits into at least three phrases
        for f in FORTUNES {
            assert!(
                split_poem_lines(f.poem).len() >= 3,
                "slip {} poem too short",
                f.id
            );
        }
    }

    #[test]
    fn test_random_fortune_respects_exclusions() {
        let mut rng = StdRng::seed_from_u64(7);
        let excluded: Vec<u32> = (1..=12).collect();

        for _ in 0..50 {
            let f = random_fortune(&excluded, &mut rng);
            assert!(!excluded.contains(&f.id));
        }
    }

    #[test]
    fn test_random_fortune_falls_back_to_full_catalog() {
        let mut rng = StdRng::seed_from_u64(7);
        let all: Vec<u32> = FORTUNES.iter().map(|f| f.id).collect();

        // every id excluded -> still yields a slip
        let f = random_fortune(&all, &mut rng);
        assert!(fortune_by_id(f.id).is_some());
    }
}
